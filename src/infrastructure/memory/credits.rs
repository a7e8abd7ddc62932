use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::repositories::CreditsProvider;
use crate::domain::user::UserContext;

/// Credit balances kept in process memory
///
/// Users seen for the first time start with `starting_credits`.
pub struct InMemoryCreditsLedger {
    starting_credits: u32,
    balances: RwLock<HashMap<Uuid, u32>>,
}

impl InMemoryCreditsLedger {
    pub fn new(starting_credits: u32) -> Self {
        Self {
            starting_credits,
            balances: RwLock::new(HashMap::new()),
        }
    }

    pub async fn set_balance(&self, user_id: Uuid, credits: u32) {
        self.balances.write().await.insert(user_id, credits);
    }

    pub async fn balance(&self, user_id: Uuid) -> u32 {
        self.balances
            .read()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or(self.starting_credits)
    }

    /// Takes `amount` credits, refusing to go below zero
    pub async fn debit(&self, user_id: Uuid, amount: u32) -> Result<u32, String> {
        let mut balances = self.balances.write().await;
        let balance = balances.entry(user_id).or_insert(self.starting_credits);
        if *balance < amount {
            return Err(format!(
                "Insufficient credits: {} available, {} required",
                balance, amount
            ));
        }
        *balance -= amount;
        Ok(*balance)
    }
}

#[async_trait]
impl CreditsProvider for InMemoryCreditsLedger {
    async fn available_credits(&self, user: &UserContext) -> Result<u32, String> {
        Ok(self.balance(user.user_id()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_users_get_the_starting_balance() {
        let ledger = InMemoryCreditsLedger::new(10);
        let user = UserContext::new(Uuid::new_v4(), "token");

        assert_eq!(ledger.available_credits(&user).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn debit_never_goes_negative() {
        let ledger = InMemoryCreditsLedger::new(3);
        let user_id = Uuid::new_v4();

        assert_eq!(ledger.debit(user_id, 2).await.unwrap(), 1);
        assert!(ledger.debit(user_id, 2).await.is_err());
        assert_eq!(ledger.balance(user_id).await, 1);
    }
}
