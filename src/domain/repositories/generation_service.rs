use async_trait::async_trait;

use crate::domain::ad::{AdSubmission, GenerationOutcome};
use crate::domain::user::UserContext;

/// External service that turns a prompt and images into ad images
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submit one ad for generation
    ///
    /// # Returns
    /// * `Ok(GenerationOutcome)` - result URLs and credits charged
    /// * `Err(String)` - human-readable failure, shown to the user as is
    async fn generate(
        &self,
        user: &UserContext,
        submission: AdSubmission,
    ) -> Result<GenerationOutcome, String>;
}
