use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::repositories::WizardSessionRepository;
use crate::domain::wizard::WizardSession;

/// Process-local store of in-flight wizard sessions
///
/// Sessions are cheap to clone: images share their bytes and the catalog is
/// behind an `Arc`.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<Uuid, WizardSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl WizardSessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &WizardSession) -> Result<(), String> {
        self.sessions
            .write()
            .await
            .insert(session.id(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WizardSession>, String> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), String> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    async fn delete_idle_since(&self, cutoff: DateTime<Utc>) -> Result<usize, String> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.updated_at() >= cutoff);
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::TemplateCatalog;
    use std::sync::Arc;

    #[tokio::test]
    async fn save_find_delete() {
        let repo = InMemorySessionRepository::new();
        let (session, _) = WizardSession::new(Uuid::new_v4(), Arc::new(TemplateCatalog::builtin()));

        repo.save(&session).await.unwrap();
        let found = repo.find_by_id(session.id()).await.unwrap().unwrap();
        assert_eq!(found.id(), session.id());
        assert_eq!(repo.len().await, 1);

        repo.delete(session.id()).await.unwrap();
        assert!(repo.find_by_id(session.id()).await.unwrap().is_none());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn idle_sessions_are_dropped() {
        let repo = InMemorySessionRepository::new();
        let catalog = Arc::new(TemplateCatalog::builtin());
        let (stale, _) = WizardSession::new(Uuid::new_v4(), catalog.clone());
        repo.save(&stale).await.unwrap();

        let cutoff = Utc::now() + chrono::Duration::milliseconds(1);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let (active, _) = WizardSession::new(Uuid::new_v4(), catalog);
        repo.save(&active).await.unwrap();

        let removed = repo.delete_idle_since(cutoff).await.unwrap();

        assert_eq!(removed, 1);
        assert!(repo.find_by_id(stale.id()).await.unwrap().is_none());
        assert!(repo.find_by_id(active.id()).await.unwrap().is_some());
    }
}
