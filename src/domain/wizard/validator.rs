use crate::domain::catalog::Step;

use super::values::ValueBag;
use super::BlockReason;

/// Names of required, visible fields that have no answer yet
pub fn missing_fields<'a>(step: &'a Step, values: &ValueBag) -> Vec<&'a str> {
    step.fields
        .iter()
        .filter(|field| !field.optional && field.is_visible(values))
        .filter(|field| !values.is_filled(&field.name))
        .map(|field| field.name.as_str())
        .collect()
}

/// A step is valid when every required, visible field is answered
///
/// Hidden fields are never required, whatever their `optional` flag says.
pub fn is_step_valid(step: &Step, values: &ValueBag) -> bool {
    missing_fields(step, values).is_empty()
}

/// Inputs a Next gate is evaluated against
pub struct StepContext<'a> {
    pub step: &'a Step,
    pub values: &'a ValueBag,
    pub ad_name: &'a str,
}

/// One condition Next must satisfy on a content step
pub trait AdvanceRule: Sync {
    fn check(&self, ctx: &StepContext<'_>) -> Result<(), BlockReason>;
}

/// The step's own required fields
pub struct RequiredFields;

impl AdvanceRule for RequiredFields {
    fn check(&self, ctx: &StepContext<'_>) -> Result<(), BlockReason> {
        let missing = missing_fields(ctx.step, ctx.values);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BlockReason::IncompleteStep {
                missing: missing.into_iter().map(str::to_string).collect(),
            })
        }
    }
}

/// The ad's display name, which lives outside every step
pub struct AdNameRequired;

impl AdvanceRule for AdNameRequired {
    fn check(&self, ctx: &StepContext<'_>) -> Result<(), BlockReason> {
        if ctx.ad_name.trim().is_empty() {
            Err(BlockReason::MissingAdName)
        } else {
            Ok(())
        }
    }
}

/// Rules applied, in order, before leaving any content step
pub static CONTENT_STEP_RULES: [&dyn AdvanceRule; 2] = [&RequiredFields, &AdNameRequired];

/// First rule that blocks Next on a content step, if any
pub fn check_content_step(ctx: &StepContext<'_>) -> Result<(), BlockReason> {
    CONTENT_STEP_RULES.iter().try_for_each(|rule| rule.check(ctx))
}
