use async_trait::async_trait;
use serde::Deserialize;

use super::client::{check_status, BaasClient};
use crate::domain::repositories::CreditsProvider;
use crate::domain::user::UserContext;

#[derive(Deserialize)]
struct CreditsRow {
    credits: i64,
}

/// Reads the caller's balance from the `user_credits` table
pub struct HttpCreditsProvider {
    client: BaasClient,
}

impl HttpCreditsProvider {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CreditsProvider for HttpCreditsProvider {
    async fn available_credits(&self, user: &UserContext) -> Result<u32, String> {
        let response = self
            .client
            .rest(user, "user_credits")
            .query(&[
                ("select", "credits".to_string()),
                ("user_id", format!("eq.{}", user.user_id())),
            ])
            .send()
            .await
            .map_err(|e| format!("Failed to load credits: {}", e))?;

        let rows: Vec<CreditsRow> = check_status(response, "Loading credits")
            .await?
            .json()
            .await
            .map_err(|e| format!("Failed to parse credits: {}", e))?;

        // No row yet means the user has never bought credits
        let credits = rows.first().map(|row| row.credits).unwrap_or(0);
        Ok(u32::try_from(credits.max(0)).unwrap_or(u32::MAX))
    }
}
