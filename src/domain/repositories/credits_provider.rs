use async_trait::async_trait;

use crate::domain::user::UserContext;

/// Read-only view of a user's credit balance
///
/// The balance is debited by the generation service on success, never by the
/// wizard itself.
#[async_trait]
pub trait CreditsProvider: Send + Sync {
    async fn available_credits(&self, user: &UserContext) -> Result<u32, String>;
}
