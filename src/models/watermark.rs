//! Watermark compositing settings

use std::str::FromStr;

use crate::error::AppError;

/// Where copies of the watermark are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// One copy at the top-left corner of every cell of a `columns × rows` grid
    Tiled {
        /// Grid columns
        columns: u32,
        /// Grid rows
        rows: u32,
    },
    /// A single copy at the bottom-left corner
    Corner {
        /// Distance in pixels from the left and bottom edges
        padding: u32,
    },
}

impl Default for Placement {
    fn default() -> Self {
        Self::Tiled { columns: 4, rows: 4 }
    }
}

impl FromStr for Placement {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiled" | "grid" => Ok(Self::default()),
            "corner" | "bottom-left" => Ok(Self::Corner { padding: 10 }),
            other => Err(AppError::Config(format!(
                "unknown watermark placement '{}', expected 'tiled' or 'corner'",
                other
            ))),
        }
    }
}

/// How the watermark is composited onto a generated image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkSettings {
    /// Multiplier applied to the watermark's alpha channel, `0.0..=1.0`
    pub opacity: f32,
    /// Where copies are drawn
    pub placement: Placement,
    /// Watermark width as a fraction of the image width
    pub scale_fraction: f32,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            placement: Placement::default(),
            scale_fraction: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_placement() {
        assert_eq!("tiled".parse::<Placement>().unwrap(), Placement::Tiled { columns: 4, rows: 4 });
        assert_eq!(" Corner ".parse::<Placement>().unwrap(), Placement::Corner { padding: 10 });
        assert!(matches!("diagonal".parse::<Placement>(), Err(AppError::Config(_))));
    }
}
