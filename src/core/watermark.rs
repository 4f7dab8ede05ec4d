use std::io::Cursor;
use std::path::PathBuf;

use image::{imageops, DynamicImage, GenericImageView, ImageOutputFormat, Rgba, RgbaImage};

use crate::{
    core::{cdn::CdnClient, upstream::fetch_bytes},
    error::{AppError, Result},
    models::watermark::{Placement, WatermarkSettings},
    state::{CdnConfig, WatermarkConfig},
    utils::watermarked_file_name,
};

/// Size of the watermark once scaled to `scale_fraction` of the image width
///
/// The result never exceeds the image height; taller marks are shrunk to fit.
pub fn scaled_size(image: (u32, u32), mark: (u32, u32), scale_fraction: f32) -> (u32, u32) {
    let (image_w, image_h) = (image.0.max(1), image.1.max(1));
    let (mark_w, mark_h) = (mark.0.max(1) as f64, mark.1.max(1) as f64);

    let width = ((image_w as f32 * scale_fraction).round() as u32).max(1);
    let height = ((width as f64 * mark_h / mark_w).round() as u32).max(1);
    if height <= image_h {
        return (width, height);
    }

    let width = ((image_h as f64 * mark_w / mark_h).round() as u32).clamp(1, image_w);
    (width, image_h)
}

/// Top-left corners at which copies of a `mark`-sized watermark are drawn
pub fn positions(image: (u32, u32), mark: (u32, u32), placement: Placement) -> Vec<(i64, i64)> {
    let (width, height) = (image.0 as i64, image.1 as i64);
    match placement {
        Placement::Tiled { columns, rows } => {
            let (columns, rows) = (columns.max(1) as i64, rows.max(1) as i64);
            (0..rows)
                .flat_map(|r| (0..columns).map(move |c| (c * width / columns, r * height / rows)))
                .collect()
        }
        Placement::Corner { padding } => {
            let padding = padding as i64;
            vec![(padding, height - mark.1 as i64 - padding)]
        }
    }
}

fn fade(mark: &RgbaImage, opacity: f32) -> RgbaImage {
    let opacity = opacity.clamp(0.0, 1.0);
    imageproc::map::map_colors(mark, |p: Rgba<u8>| {
        let [r, g, b, a] = p.0;
        Rgba([r, g, b, (a as f32 * opacity).round() as u8])
    })
}

/// Composite `mark` onto `base` according to `settings`
pub fn apply_watermark(
    base: &DynamicImage,
    mark: &DynamicImage,
    settings: &WatermarkSettings,
) -> RgbaImage {
    let mut canvas = base.to_rgba8();
    let (width, height) = canvas.dimensions();

    let (mark_w, mark_h) = scaled_size((width, height), (mark.width(), mark.height()), settings.scale_fraction);
    let scaled = imageops::resize(&mark.to_rgba8(), mark_w, mark_h, imageops::FilterType::Triangle);
    let faded = fade(&scaled, settings.opacity);

    for (x, y) in positions((width, height), (mark_w, mark_h), settings.placement) {
        imageops::overlay(&mut canvas, &faded, x, y);
    }

    canvas
}

/// Encode an image as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

/// Downloads a generated image, watermarks it, and uploads the composite
#[derive(Debug, Clone)]
pub struct Watermarker {
    http: reqwest::Client,
    asset_path: PathBuf,
    settings: WatermarkSettings,
    cdn: CdnClient,
}

impl Watermarker {
    /// Create a watermarker sharing `http`'s connection pool
    pub fn new(http: reqwest::Client, watermark: &WatermarkConfig, cdn: &CdnConfig) -> Self {
        Self {
            cdn: CdnClient::new(http.clone(), cdn),
            http,
            asset_path: watermark.asset_path.clone(),
            settings: watermark.settings,
        }
    }

    /// Watermark the image at `image_url` and return the CDN url of the result
    pub async fn watermark_url(&self, image_url: &str) -> Result<String> {
        let (image_bytes, mark_bytes) = tokio::try_join!(
            fetch_bytes(&self.http, "image download", image_url),
            async { Ok::<_, AppError>(tokio::fs::read(&self.asset_path).await?) },
        )?;

        let settings = self.settings;
        let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let base = image::load_from_memory(&image_bytes)?;
            let mark = image::load_from_memory(&mark_bytes)?;
            encode_png(&apply_watermark(&base, &mark, &settings))
        })
        .await??;

        let file_name = watermarked_file_name(chrono::Utc::now());
        tracing::debug!(source = image_url, bytes = png.len(), "watermark applied");
        self.cdn.upload(png, &file_name).await
    }
}
