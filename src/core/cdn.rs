use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::{core::upstream::ensure_success, error::Result, state::CdnConfig};

const SERVICE: &str = "cdn";

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
    #[serde(rename = "fileId", default)]
    file_id: Option<String>,
}

/// Client for the CDN upload endpoint
#[derive(Debug, Clone)]
pub struct CdnClient {
    http: reqwest::Client,
    upload_url: String,
    private_key: String,
}

impl CdnClient {
    /// Create a client sharing `http`'s connection pool
    pub fn new(http: reqwest::Client, config: &CdnConfig) -> Self {
        Self {
            http,
            upload_url: config.upload_url.clone(),
            private_key: config.private_key.clone(),
        }
    }

    /// Upload `data` as `file_name` and return its public url
    pub async fn upload(&self, data: Vec<u8>, file_name: &str) -> Result<String> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let size = data.len();
        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())?;
        let form = Form::new()
            .part("file", part)
            .text("fileName", file_name.to_string());

        let response = self
            .http
            .post(&self.upload_url)
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        let UploadResponse { url, file_id } = response.json().await?;

        tracing::info!(file_name, size, file_id = file_id.as_deref().unwrap_or("-"), %url, "uploaded to cdn");
        Ok(url)
    }
}
