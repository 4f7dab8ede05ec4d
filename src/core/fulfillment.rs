use http::header::AUTHORIZATION;
use serde_json::{json, Value};

use crate::{
    core::upstream::ensure_success,
    error::Result,
    models::product::{NewProduct, ProductCreated, ProductSpec, UploadedImage, VariantCatalog},
    state::FulfillmentConfig,
};

const SERVICE: &str = "fulfillment";

/// Client for the print-on-demand fulfillment API
///
/// Every call forwards the caller's credentials verbatim as `Authorization`.
#[derive(Debug, Clone)]
pub struct FulfillmentClient {
    http: reqwest::Client,
    base_url: String,
    shop_id: String,
    placeholder_image_id: String,
}

impl FulfillmentClient {
    /// Create a client sharing `http`'s connection pool
    pub fn new(http: reqwest::Client, config: &FulfillmentConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            shop_id: config.shop_id.clone(),
            placeholder_image_id: config.placeholder_image_id.clone(),
        }
    }

    /// Catalog variants of a blueprint from one print provider
    pub async fn variants(&self, blueprint_id: u64, provider_id: u64, token: &str) -> Result<VariantCatalog> {
        let url = format!(
            "{}/v1/catalog/blueprints/{}/print_providers/{}/variants.json",
            self.base_url, blueprint_id, provider_id
        );
        let response = self.http.get(url).header(AUTHORIZATION, token).send().await?;
        let response = ensure_success(SERVICE, response).await?;
        Ok(response.json().await?)
    }

    /// Register the image at `url` with the fulfillment API's media library
    pub async fn upload_image(&self, file_name: &str, url: &str, token: &str) -> Result<UploadedImage> {
        let response = self
            .http
            .post(format!("{}/v1/uploads/images.json", self.base_url))
            .header(AUTHORIZATION, token)
            .json(&json!({ "file_name": file_name, "url": url }))
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        Ok(response.json().await?)
    }

    /// Create a product in the configured shop
    pub async fn create_product(&self, product: &NewProduct, token: &str) -> Result<ProductCreated> {
        let response = self
            .http
            .post(format!("{}/v1/shops/{}/products.json", self.base_url, self.shop_id))
            .header(AUTHORIZATION, token)
            .json(product)
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;
        Ok(response.json().await?)
    }

    /// Look up variants, upload the artwork, and create the product described by `spec`
    pub async fn create_from_spec(&self, spec: &ProductSpec) -> Result<ProductCreated> {
        let catalog = self
            .variants(spec.blueprint_id, spec.provider_id, &spec.token)
            .await?;
        let uploaded = self
            .upload_image(&spec.file_name, &spec.image_url, &spec.token)
            .await?;
        tracing::debug!(
            blueprint_id = spec.blueprint_id,
            variants = catalog.variants.len(),
            image_id = %uploaded.id,
            "artwork uploaded"
        );

        let product = spec.to_new_product(&catalog, &uploaded.id, &self.placeholder_image_id);
        let created = self.create_product(&product, &spec.token).await?;

        tracing::info!(product_id = ?created.id, title = %product.title, "product created");
        Ok(created)
    }

    /// Forward a shipping quote request and return the upstream body unchanged
    pub async fn calculate_shipping(&self, body: &Value, authorization: Option<&str>) -> Result<Value> {
        let mut request = self
            .http
            .post(format!("{}/v1/shops/{}/orders/shipping.json", self.base_url, self.shop_id))
            .json(body);
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = ensure_success(SERVICE, request.send().await?).await?;
        Ok(response.json().await?)
    }
}
