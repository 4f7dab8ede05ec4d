use serde::Serialize;

/// Response of the face-swap route
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FaceSwapResponse {
    /// Watermarking is configured
    Watermarked {
        /// CDN url of the watermarked preview
        #[serde(rename = "previewUrl")]
        preview_url: String,
        /// Url of the unmarked image, used for the printed product
        #[serde(rename = "productUrl")]
        product_url: String,
    },
    /// Watermarking is off
    Plain {
        /// Url of the generated image
        url: String,
    },
}

/// A single generated image
#[derive(Debug, Serialize)]
pub struct ImageResponse {
    /// Url of the image
    pub url: String,
}

/// Response of the text-to-image route
#[derive(Debug, Serialize)]
pub struct TextToImageResponse {
    /// First generated image
    pub url: String,
    /// Every generated image, when more than one sample was requested
    pub urls: Vec<String>,
}
