// Ad module
// Boundary types exchanged with the generation service and the ad store

pub mod value_objects;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::wizard::images::ImageBlob;

pub use value_objects::{Orientation, Quality};

/// Previously generated ad loaded to reopen the wizard in edit mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingAd {
    pub id: Uuid,
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub original_image_urls: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub result_urls: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(default)]
    pub ad_type: Option<String>,
    #[serde(default)]
    pub dimensions: Option<String>,
}

/// Backend rows may carry `null` where no images were stored
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Everything the generation service needs to produce an ad
#[derive(Debug, Clone)]
pub struct AdSubmission {
    pub images: Vec<ImageBlob>,
    /// Already-hosted source images, used when reopening an existing ad
    pub image_urls: Vec<String>,
    pub prompt: String,
    pub name: String,
    pub brand_id: Option<String>,
    pub num_samples: u32,
    pub quality: Option<Quality>,
    pub ad_type: String,
    pub dimensions: Option<String>,
}

/// Successful generation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub images: Vec<String>,
    pub credits_used: u32,
}
