//! Utility functions and helpers

use chrono::{DateTime, Datelike, Utc};

/// CDN file name for a watermarked image created at `now`
///
/// The month is zero-based, matching the names already stored on the CDN.
#[cfg_attr(not(feature = "watermark"), allow(dead_code))]
pub(crate) fn watermarked_file_name(now: DateTime<Utc>) -> String {
    format!(
        "hg-watermarked-image-{}-{}-{}-{}.png",
        now.timestamp_millis(),
        now.day(),
        now.month0(),
        now.year()
    )
}

/// Compare two secrets without short-circuiting on the first differing byte
#[cfg_attr(not(feature = "api"), allow(dead_code))]
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_watermarked_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 12, 5, 10, 30, 0).unwrap();
        assert_eq!(
            watermarked_file_name(now),
            format!("hg-watermarked-image-{}-5-11-2024.png", now.timestamp_millis())
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
        assert!(!constant_time_eq(b"", b"x"));
    }
}
