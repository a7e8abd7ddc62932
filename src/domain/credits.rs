use serde::Serialize;
use thiserror::Error;

/// Hard ceiling on images per generation request
pub const MAX_SAMPLES_PER_REQUEST: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreditsError {
    #[error("cost per sample must be positive")]
    ZeroCost,
}

/// Pricing rules applied to a generation request
///
/// # Invariants
/// - Cost per sample is strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditPolicy {
    cost_per_sample: u32,
}

impl CreditPolicy {
    pub fn new(cost_per_sample: u32) -> Result<Self, CreditsError> {
        if cost_per_sample == 0 {
            return Err(CreditsError::ZeroCost);
        }
        Ok(Self { cost_per_sample })
    }

    pub fn cost_per_sample(&self) -> u32 {
        self.cost_per_sample
    }

    /// Credits charged for `samples` images
    pub fn cost_of(&self, samples: u32) -> u32 {
        samples.saturating_mul(self.cost_per_sample)
    }

    /// Largest sample count the balance can pay for, capped per request
    pub fn max_samples(&self, available_credits: u32) -> u32 {
        (available_credits / self.cost_per_sample).min(MAX_SAMPLES_PER_REQUEST)
    }

    /// Quantity control state for a balance
    pub fn quantity_bound(&self, available_credits: u32) -> QuantityBound {
        let max = self.max_samples(available_credits);
        QuantityBound {
            min: 1,
            max,
            enabled: max > 0,
            cost_per_sample: self.cost_per_sample,
            available_credits,
        }
    }
}

/// Range offered by the sample quantity control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantityBound {
    pub min: u32,
    pub max: u32,
    /// False when the balance cannot pay for a single sample
    pub enabled: bool,
    pub cost_per_sample: u32,
    pub available_credits: u32,
}

impl QuantityBound {
    /// Clamps a requested quantity into range, `None` when disabled
    pub fn clamp(&self, requested: u32) -> Option<u32> {
        if !self.enabled {
            return None;
        }
        Some(requested.clamp(self.min, self.max))
    }
}

/// Blocking confirmation shown before credits are spent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub num_samples: u32,
    pub cost_per_sample: u32,
    pub total_cost: u32,
    pub available_credits: u32,
}

impl Confirmation {
    /// Builds the confirmation for a request, clamping the quantity
    ///
    /// Returns `None` when the balance cannot cover a single sample.
    pub fn for_request(policy: &CreditPolicy, requested: u32, available_credits: u32) -> Option<Self> {
        let num_samples = policy.quantity_bound(available_credits).clamp(requested)?;
        Some(Self {
            num_samples,
            cost_per_sample: policy.cost_per_sample(),
            total_cost: policy.cost_of(num_samples),
            available_credits,
        })
    }

    pub fn message(&self) -> String {
        let noun = if self.num_samples == 1 { "image" } else { "images" };
        format!(
            "Generate {} {} for {} credits? You have {} credits available.",
            self.num_samples, noun, self.total_cost, self.available_credits
        )
    }
}
