use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::wizard::WizardSession;

/// Storage for in-flight wizard sessions
#[async_trait]
pub trait WizardSessionRepository: Send + Sync {
    /// Save a session (insert or update)
    async fn save(&self, session: &WizardSession) -> Result<(), String>;

    /// Find a session by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<WizardSession>, String>;

    /// Delete a session by ID
    async fn delete(&self, id: Uuid) -> Result<(), String>;

    /// Delete every session last changed before `cutoff`
    ///
    /// # Returns
    /// The number of sessions removed
    async fn delete_idle_since(&self, cutoff: DateTime<Utc>) -> Result<usize, String>;
}
