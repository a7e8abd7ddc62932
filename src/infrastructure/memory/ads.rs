use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ad::ExistingAd;
use crate::domain::repositories::AdRepository;
use crate::domain::user::UserContext;

/// Previously generated ads, keyed by ad ID and tagged with their owner
#[derive(Default)]
pub struct InMemoryAdRepository {
    ads: RwLock<HashMap<Uuid, (Uuid, ExistingAd)>>,
}

impl InMemoryAdRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, owner: Uuid, ad: ExistingAd) {
        self.ads.write().await.insert(ad.id, (owner, ad));
    }
}

#[async_trait]
impl AdRepository for InMemoryAdRepository {
    async fn find_by_id(&self, user: &UserContext, id: Uuid) -> Result<Option<ExistingAd>, String> {
        Ok(self
            .ads
            .read()
            .await
            .get(&id)
            .filter(|(owner, _)| *owner == user.user_id())
            .map(|(_, ad)| ad.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ads_are_only_visible_to_their_owner() {
        let repo = InMemoryAdRepository::new();
        let owner = UserContext::new(Uuid::new_v4(), "a");
        let stranger = UserContext::new(Uuid::new_v4(), "b");
        let ad = ExistingAd {
            id: Uuid::new_v4(),
            prompt: "X".to_string(),
            original_image_urls: Vec::new(),
            result_urls: Vec::new(),
            name: None,
            brand_id: None,
            ad_type: None,
            dimensions: None,
        };
        repo.insert(owner.user_id(), ad.clone()).await;

        assert_eq!(repo.find_by_id(&owner, ad.id).await.unwrap(), Some(ad.clone()));
        assert_eq!(repo.find_by_id(&stranger, ad.id).await.unwrap(), None);
    }
}
