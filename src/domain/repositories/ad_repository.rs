use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ad::ExistingAd;
use crate::domain::user::UserContext;

/// Read access to previously generated ads
#[async_trait]
pub trait AdRepository: Send + Sync {
    /// Find one of the caller's ads by ID
    async fn find_by_id(&self, user: &UserContext, id: Uuid) -> Result<Option<ExistingAd>, String>;
}
