use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::user::UserContext;

/// Connection details shared by every backend adapter
///
/// Requests carry the project's anonymous key and the caller's own access
/// token, so row-level security on the backend applies as if the user had
/// called it directly.
#[derive(Clone)]
pub struct BaasClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl BaasClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, timeout: Duration) -> Result<Self, String> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET against a table of the REST interface
    pub fn rest(&self, user: &UserContext, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        self.authorize(self.http.get(url), user)
    }

    /// POST to a deployed edge function
    pub fn function(&self, user: &UserContext, name: &str) -> RequestBuilder {
        let url = format!("{}/functions/v1/{}", self.base_url, name);
        self.authorize(self.http.post(url), user)
    }

    fn authorize(&self, request: RequestBuilder, user: &UserContext) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(user.access_token())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

/// Fails with the backend's own message when the status is not 2xx
pub(crate) async fn check_status(response: Response, action: &str) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    tracing::warn!(%status, "{} failed: {}", action, detail);
    if detail.trim().is_empty() {
        Err(format!("{} failed ({})", action, status))
    } else {
        Err(detail)
    }
}
