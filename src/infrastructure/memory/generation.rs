use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::credits::InMemoryCreditsLedger;
use crate::domain::ad::{AdSubmission, GenerationOutcome};
use crate::domain::credits::CreditPolicy;
use crate::domain::repositories::GenerationService;
use crate::domain::user::UserContext;

/// Fake generator that charges the ledger and returns placeholder URLs
pub struct InMemoryGenerationService {
    ledger: Arc<InMemoryCreditsLedger>,
    policy: CreditPolicy,
}

impl InMemoryGenerationService {
    pub fn new(ledger: Arc<InMemoryCreditsLedger>, policy: CreditPolicy) -> Self {
        Self { ledger, policy }
    }
}

#[async_trait]
impl GenerationService for InMemoryGenerationService {
    async fn generate(
        &self,
        user: &UserContext,
        submission: AdSubmission,
    ) -> Result<GenerationOutcome, String> {
        let cost = self.policy.cost_of(submission.num_samples);
        let remaining = self.ledger.debit(user.user_id(), cost).await?;

        tracing::info!(
            user_id = %user.user_id(),
            ad_type = %submission.ad_type,
            num_samples = submission.num_samples,
            remaining,
            "generated placeholder ad"
        );

        let images = (0..submission.num_samples)
            .map(|_| format!("memory://generated/{}.png", Uuid::new_v4()))
            .collect();

        Ok(GenerationOutcome {
            images,
            credits_used: cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(num_samples: u32) -> AdSubmission {
        AdSubmission {
            images: Vec::new(),
            image_urls: vec!["a.png".to_string()],
            prompt: "A mug".to_string(),
            name: "Mug".to_string(),
            brand_id: None,
            num_samples,
            quality: None,
            ad_type: "flat-lay".to_string(),
            dimensions: None,
        }
    }

    #[tokio::test]
    async fn charges_cost_per_sample() {
        let ledger = Arc::new(InMemoryCreditsLedger::new(10));
        let service = InMemoryGenerationService::new(ledger.clone(), CreditPolicy::new(2).unwrap());
        let user = UserContext::new(Uuid::new_v4(), "token");

        let outcome = service.generate(&user, submission(3)).await.unwrap();

        assert_eq!(outcome.images.len(), 3);
        assert_eq!(outcome.credits_used, 6);
        assert_eq!(ledger.balance(user.user_id()).await, 4);
    }

    #[tokio::test]
    async fn refuses_when_balance_is_short() {
        let ledger = Arc::new(InMemoryCreditsLedger::new(1));
        let service = InMemoryGenerationService::new(ledger, CreditPolicy::new(1).unwrap());
        let user = UserContext::new(Uuid::new_v4(), "token");

        let err = service.generate(&user, submission(2)).await.unwrap_err();

        assert!(err.starts_with("Insufficient credits"));
    }
}
