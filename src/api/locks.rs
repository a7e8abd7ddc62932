use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per wizard session
///
/// Handlers that change a session hold its guard from load to save, so two
/// requests on the same session never work on diverging copies.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other request holds the session
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self.locks.lock().await.entry(id).or_default().clone();
        lock.lock_owned().await
    }

    /// Drops the entries nobody holds or waits on
    pub async fn prune(&self) -> usize {
        let mut locks = self.locks.lock().await;
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_session_waits_for_the_holder() {
        let locks = SessionLocks::new();
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let blocked = tokio::time::timeout(Duration::from_millis(20), locks.acquire(id)).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(20), locks.acquire(id)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn other_sessions_do_not_wait() {
        let locks = SessionLocks::new();
        let _held = locks.acquire(Uuid::new_v4()).await;

        let other = tokio::time::timeout(Duration::from_millis(20), locks.acquire(Uuid::new_v4())).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let locks = SessionLocks::new();
        let held = locks.acquire(Uuid::new_v4()).await;
        drop(locks.acquire(Uuid::new_v4()).await);

        assert_eq!(locks.prune().await, 1);
        assert_eq!(locks.len().await, 1);
        drop(held);
        assert_eq!(locks.prune().await, 1);
    }
}
