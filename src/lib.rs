#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

//! # giftforge
//!
//! Backend for a personalised-gift storefront: it proxies image generation
//! jobs to a generative-image API and forwards print-on-demand requests to a
//! fulfillment API.
//!
//! ## Features
//!
//! - **Generation**: face swap, super-resolution and text-to-image jobs,
//!   submitted once and polled until they finish, fail, or time out
//! - **Compression**: optional shrinking of face-swap inputs before submission
//! - **Watermarking**: tiled or corner watermark on face-swap previews,
//!   uploaded to a CDN
//! - **Fulfillment**: product creation and shipping quotes via pass-through routes
//! - **Web API**: axum server with a static API-key gate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use giftforge::{create_router, init, AppState, Config};
//!
//! # async fn run() -> giftforge::Result<()> {
//! init()?;
//! let state = AppState::new(Config::load()?)?;
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

// Internal modules
#[cfg(feature = "api")]
pub mod api;
pub mod core;
/// Defines the application's error types and result aliases.
pub mod error;
pub mod models;
mod state;
mod utils;

/// Build-time package information
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

// Public API exports
pub use crate::{
    core::generation::{GenerationClient, PollPolicy},
    error::{AppError, Result, ResultExt},
    models::job::{Job, JobKind, JobStatus},
    state::{
        AppState, CdnConfig, CompressionConfig, Config, FulfillmentConfig, GenerationConfig,
        WatermarkConfig,
    },
};

#[cfg(feature = "api")]
pub use crate::api::create_router;

/// Initialize logging
///
/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
/// It should be called early in the application startup process.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::Internal(format!("failed to install tracing subscriber: {}", e)))?;

    tracing::info!(
        version = built_info::PKG_VERSION,
        built = built_info::BUILT_TIME_UTC,
        "initializing {}",
        built_info::PKG_NAME
    );
    Ok(())
}
