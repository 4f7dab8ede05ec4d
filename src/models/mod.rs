//! Data types exchanged with callers and upstream APIs

/// Generation request bodies and model parameters.
pub mod generation;
/// Generation jobs and their polled status.
pub mod job;
/// Product creation bodies for the fulfillment API.
pub mod product;
/// Watermark compositing settings.
pub mod watermark;
