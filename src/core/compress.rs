use serde::Deserialize;
use serde_json::json;

use crate::{core::upstream::ensure_success, error::Result, state::CompressionConfig};

const SERVICE: &str = "compression";

#[derive(Deserialize)]
struct ShrinkResponse {
    output: ShrinkOutput,
}

#[derive(Deserialize)]
struct ShrinkOutput {
    url: String,
}

/// Client for the image compression service
#[derive(Debug, Clone)]
pub struct CompressionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CompressionClient {
    /// Create a client sharing `http`'s connection pool
    pub fn new(http: reqwest::Client, config: &CompressionConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Compress the image at `url`, returning the url of the compressed copy
    pub async fn compress(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/shrink", self.base_url))
            .basic_auth("api", Some(&self.api_key))
            .json(&json!({ "source": { "url": url } }))
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        let ShrinkResponse { output } = response.json().await?;

        tracing::debug!(source = url, compressed = %output.url, "image compressed");
        Ok(output.url)
    }
}
