use async_trait::async_trait;
use uuid::Uuid;

use super::client::{check_status, BaasClient};
use crate::domain::ad::ExistingAd;
use crate::domain::repositories::AdRepository;
use crate::domain::user::UserContext;

/// Loads previously generated ads from the `ads` table
pub struct HttpAdRepository {
    client: BaasClient,
}

impl HttpAdRepository {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AdRepository for HttpAdRepository {
    async fn find_by_id(&self, user: &UserContext, id: Uuid) -> Result<Option<ExistingAd>, String> {
        let response = self
            .client
            .rest(user, "ads")
            .query(&[
                (
                    "select",
                    "id,prompt,original_image_urls,result_urls,name,brand_id,ad_type,dimensions"
                        .to_string(),
                ),
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", user.user_id())),
            ])
            .send()
            .await
            .map_err(|e| format!("Failed to load ad: {}", e))?;

        let mut rows: Vec<ExistingAd> = check_status(response, "Loading ad")
            .await?
            .json()
            .await
            .map_err(|e| format!("Failed to parse ad: {}", e))?;

        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }
}
