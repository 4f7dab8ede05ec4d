//! Request bodies sent to the generation API

use serde::Serialize;
use serde_json::{json, Value};

use super::job::JobKind;

/// Parameters of the super-resolution model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpscaleParams {
    /// Upstream model name
    pub model_name: String,
    /// Output scale factor
    pub scale_factor: u32,
    /// Tile size used by the upscaler
    pub tile: u32,
}

impl Default for UpscaleParams {
    fn default() -> Self {
        Self {
            model_name: String::from("RealESRGAN_x4plus"),
            scale_factor: 4,
            tile: 150,
        }
    }
}

/// Model parameters for text-to-image jobs, fixed at startup
///
/// Unset values are left out of the request body so the upstream defaults apply.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextToImageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lora_models: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lora_weights: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_skip: Option<u32>,
    pub safety_checker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_adapter_image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_adapter: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_adapter_scale: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
}

/// One generation job, built from an inbound request body
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    /// Put the face from `source_image_url` onto `target_image_url`
    FaceSwap {
        /// Image providing the face
        source_image_url: String,
        /// Image receiving the face
        target_image_url: String,
    },
    /// Super-resolution of a single image
    Upscale {
        /// Image to upscale
        image_url: String,
        /// Model parameters
        params: UpscaleParams,
    },
    /// Text prompt to image
    TextToImage {
        /// The prompt
        prompt: String,
        /// Model parameters
        params: TextToImageParams,
    },
}

impl GenerationRequest {
    /// Which upstream job family handles this request
    pub fn kind(&self) -> JobKind {
        match self {
            Self::FaceSwap { .. } => JobKind::FaceSwap,
            Self::Upscale { .. } => JobKind::Upscale,
            Self::TextToImage { .. } => JobKind::TextToImage,
        }
    }

    /// JSON body for the submission call
    pub fn to_payload(&self) -> crate::Result<Value> {
        let body = match self {
            Self::FaceSwap {
                source_image_url,
                target_image_url,
            } => json!({
                "input_face": source_image_url,
                "input_image": target_image_url,
            }),
            Self::Upscale { image_url, params } => json!({
                "model_name": params.model_name,
                "init_image": image_url,
                "scale_factor": params.scale_factor,
                "tile": params.tile,
            }),
            Self::TextToImage { prompt, params } => {
                let mut body = serde_json::to_value(params)?;
                if let Value::Object(map) = &mut body {
                    map.insert("prompt".to_string(), Value::String(prompt.clone()));
                }
                body
            }
        };
        Ok(body)
    }
}
