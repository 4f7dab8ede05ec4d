//! API module for handling HTTP requests and responses

/// API-key gate middleware.
pub mod auth;
mod extract;
pub(crate) mod handlers;
/// Response bodies of the generation routes.
pub mod responses;

use axum::{
    http::HeaderName,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub use extract::ApiJson;
pub(crate) use handlers::*;

/// Create the application router with all routes
///
/// The generation routes and the country list sit behind [`auth::require_api_key`];
/// the keep-alive and fulfillment routes are open.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let gated = Router::new()
        .route("/api/generate-image", post(generate_image))
        .route("/api/upscale-image", post(upscale_image))
        .route("/api/text2image", post(text_to_image))
        .route("/api/get-countries", get(get_countries))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    let open = Router::new()
        .route("/api/keep-alive", get(keep_alive))
        .route("/api/create-product", post(create_product))
        .route("/api/create-product-2", post(create_product))
        .route("/api/calculate-shipping", post(calculate_shipping));

    let request_id = HeaderName::from_static("x-request-id");

    gated
        .merge(open)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}
