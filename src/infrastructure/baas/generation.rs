use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::client::{check_status, BaasClient};
use crate::domain::ad::{AdSubmission, GenerationOutcome};
use crate::domain::repositories::GenerationService;
use crate::domain::user::UserContext;

/// Reply of the generation function
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    credits_used: u32,
    #[serde(default)]
    error: Option<String>,
}

/// Calls the hosted generation function with a multipart request
pub struct HttpGenerationService {
    client: BaasClient,
    function: String,
}

impl HttpGenerationService {
    pub fn new(client: BaasClient, function: impl Into<String>) -> Self {
        Self {
            client,
            function: function.into(),
        }
    }
}

/// Multipart body in the field layout the function expects
fn submission_form(submission: AdSubmission) -> Result<Form, String> {
    let mut form = Form::new()
        .text("prompt", submission.prompt)
        .text("name", submission.name)
        .text("numSamples", submission.num_samples.to_string())
        .text("adType", submission.ad_type);

    for image in &submission.images {
        let part = Part::bytes(image.data().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.content_type())
            .map_err(|e| format!("Invalid content type for {}: {}", image.file_name(), e))?;
        form = form.part("images", part);
    }
    if !submission.image_urls.is_empty() {
        let urls = serde_json::to_string(&submission.image_urls)
            .map_err(|e| format!("Failed to encode image URLs: {}", e))?;
        form = form.text("imageUrls", urls);
    }
    if let Some(brand_id) = submission.brand_id {
        form = form.text("brandId", brand_id);
    }
    if let Some(quality) = submission.quality {
        form = form.text("quality", quality.as_str());
    }
    if let Some(dimensions) = submission.dimensions {
        form = form.text("dimensions", dimensions);
    }

    Ok(form)
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(
        &self,
        user: &UserContext,
        submission: AdSubmission,
    ) -> Result<GenerationOutcome, String> {
        let form = submission_form(submission)?;

        let response = self
            .client
            .function(user, &self.function)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Failed to reach the generation service: {}", e))?;

        let reply: GenerationReply = check_status(response, "Generation")
            .await?
            .json()
            .await
            .map_err(|e| format!("Failed to parse generation reply: {}", e))?;

        if !reply.success {
            return Err(reply
                .error
                .unwrap_or_else(|| "Generation failed".to_string()));
        }

        Ok(GenerationOutcome {
            images: reply.images,
            credits_used: reply.credits_used,
        })
    }
}
