//! Upstream clients and image post-processing

/// Uploads of processed images to the CDN.
pub mod cdn;
/// Image compression before generation.
pub mod compress;
/// Country list parsing.
pub mod countries;
/// Print-on-demand product creation and shipping quotes.
pub mod fulfillment;
/// Generation job submission and status polling.
pub mod generation;
mod upstream;
/// Watermark compositing and upload.
#[cfg(feature = "watermark")]
pub mod watermark;
