use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    core::countries::{load_countries, Country},
    error::Result,
    models::{
        generation::GenerationRequest,
        product::{ProductCreated, ProductSpec},
    },
    AppState,
};

use super::{
    extract::ApiJson,
    responses::{FaceSwapResponse, ImageResponse, TextToImageResponse},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceSwapBody {
    pub uploaded_image: String,
    pub target_image: String,
}

#[derive(Debug, Deserialize)]
pub struct UpscaleBody {
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct TextToImageBody {
    pub prompt: String,
}

pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<FaceSwapBody>,
) -> Result<Json<FaceSwapResponse>> {
    tracing::info!(uploaded = %body.uploaded_image, target = %body.target_image, "face swap requested");

    let (source_image_url, target_image_url) = match &state.compressor {
        Some(compressor) => (
            compressor.compress(&body.uploaded_image).await?,
            compressor.compress(&body.target_image).await?,
        ),
        None => (body.uploaded_image, body.target_image),
    };

    let job = state
        .generation
        .run(&GenerationRequest::FaceSwap {
            source_image_url,
            target_image_url,
        })
        .await?;
    let product_url = job.first_url()?.to_string();

    #[cfg(feature = "watermark")]
    if let Some(watermarker) = &state.watermarker {
        let preview_url = watermarker.watermark_url(&product_url).await?;
        return Ok(Json(FaceSwapResponse::Watermarked {
            preview_url,
            product_url,
        }));
    }

    Ok(Json(FaceSwapResponse::Plain { url: product_url }))
}

pub async fn upscale_image(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<UpscaleBody>,
) -> Result<Json<ImageResponse>> {
    let job = state
        .generation
        .run(&GenerationRequest::Upscale {
            image_url: body.image,
            params: state.config.generation.upscale.clone(),
        })
        .await?;

    Ok(Json(ImageResponse {
        url: job.first_url()?.to_string(),
    }))
}

pub async fn text_to_image(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<TextToImageBody>,
) -> Result<Json<TextToImageResponse>> {
    tracing::info!(prompt = %body.prompt, "text-to-image requested");

    let job = state
        .generation
        .run(&GenerationRequest::TextToImage {
            prompt: body.prompt,
            params: state.config.generation.text_to_image.clone(),
        })
        .await?;
    let url = job.first_url()?.to_string();

    Ok(Json(TextToImageResponse {
        url,
        urls: job.into_urls(),
    }))
}

pub async fn get_countries(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Country>>> {
    let countries = load_countries(&state.config.countries_path).await?;
    tracing::debug!(count = countries.len(), "country list served");
    Ok(Json(countries))
}

pub async fn keep_alive(State(state): State<Arc<AppState>>) -> &'static str {
    tokio::time::sleep(state.config.keep_alive_delay).await;
    "Server Alive"
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    ApiJson(spec): ApiJson<ProductSpec>,
) -> Result<Json<ProductCreated>> {
    tracing::info!(
        blueprint_id = spec.blueprint_id,
        provider_id = spec.provider_id,
        product = %spec.product_name,
        "product creation requested"
    );
    Ok(Json(state.fulfillment.create_from_spec(&spec).await?))
}

pub async fn calculate_shipping(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>> {
    tracing::info!("calculating shipping");

    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let quote = state.fulfillment.calculate_shipping(&body, authorization).await?;
    Ok(Json(quote))
}
