//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;

use giftforge::Config;

pub const SERVER_KEY: &str = "server-secret";
pub const GENERATION_KEY: &str = "gen-key";

/// Configuration pointing every upstream at `upstream`, with a fast poll
///
/// `extra` entries override the defaults.
pub fn config(upstream: &str, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("SERVER_API_KEY", SERVER_KEY),
        ("API_KEY", GENERATION_KEY),
        ("GENERATION_API_URL", upstream),
        ("FULFILLMENT_API_URL", upstream),
        ("POLL_INTERVAL_MS", "1"),
        ("POLL_MAX_ATTEMPTS", "3"),
        ("KEEP_ALIVE_DELAY_MS", "0"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(move |key: &str| vars.get(key).cloned()).expect("test config")
}

/// A small opaque PNG filled with one color
#[cfg(feature = "watermark")]
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageOutputFormat::Png)
        .expect("encode png");
    out.into_inner()
}
