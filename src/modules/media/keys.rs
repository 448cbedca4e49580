//! Object keys for published assets.
//!
//! Videos live under their aspect bucket (`landscape/{id}.mp4`), thumbnails
//! at the bucket root (`{id}.{ext}`).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const LANDSCAPE: f64 = 16.0 / 9.0;
const PORTRAIT: f64 = 9.0 / 16.0;
const TOLERANCE: f64 = 0.01;

/// Fallback extension for MIME types missing from the table below.
pub const FALLBACK_EXTENSION: &str = "bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    Landscape,
    Portrait,
    Other,
}

impl AspectRatio {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height == 0 {
            return AspectRatio::Other;
        }
        let ratio = f64::from(width) / f64::from(height);
        if (ratio - LANDSCAPE).abs() < TOLERANCE {
            AspectRatio::Landscape
        } else if (ratio - PORTRAIT).abs() < TOLERANCE {
            AspectRatio::Portrait
        } else {
            AspectRatio::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "landscape",
            AspectRatio::Portrait => "portrait",
            AspectRatio::Other => "other",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "video/mp4" => "mp4",
        _ => FALLBACK_EXTENSION,
    }
}

pub fn video_key(aspect: AspectRatio, video_id: &Uuid) -> String {
    format!("{}/{}.mp4", aspect, video_id)
}

pub fn thumbnail_key(video_id: &Uuid, mime: &str) -> String {
    format!("{}.{}", video_id, extension_for_mime(mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_common_resolutions() {
        assert_eq!(AspectRatio::from_dimensions(1920, 1080), AspectRatio::Landscape);
        assert_eq!(AspectRatio::from_dimensions(1280, 720), AspectRatio::Landscape);
        assert_eq!(AspectRatio::from_dimensions(1080, 1920), AspectRatio::Portrait);
        assert_eq!(AspectRatio::from_dimensions(720, 1280), AspectRatio::Portrait);
        assert_eq!(AspectRatio::from_dimensions(1000, 1000), AspectRatio::Other);
        assert_eq!(AspectRatio::from_dimensions(640, 480), AspectRatio::Other);
    }

    #[test]
    fn test_classification_tolerance_boundary() {
        // 854x480 is 1.7792, within 0.01 of 16:9
        assert_eq!(AspectRatio::from_dimensions(854, 480), AspectRatio::Landscape);
        // 1800x1000 is 1.8, just outside
        assert_eq!(AspectRatio::from_dimensions(1800, 1000), AspectRatio::Other);
        // 1000x1800 is 0.5556, within 0.01 of 9:16 (0.5625)
        assert_eq!(AspectRatio::from_dimensions(1000, 1800), AspectRatio::Portrait);
        // 1000x1850 is 0.5405, outside
        assert_eq!(AspectRatio::from_dimensions(1000, 1850), AspectRatio::Other);
    }

    #[test]
    fn test_zero_height_is_other() {
        assert_eq!(AspectRatio::from_dimensions(1920, 0), AspectRatio::Other);
    }

    #[test]
    fn test_extension_table_falls_back() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/gif"), "gif");
        assert_eq!(extension_for_mime("image/webp"), FALLBACK_EXTENSION);
        assert_eq!(extension_for_mime(""), FALLBACK_EXTENSION);
        assert_eq!(extension_for_mime("not a mime"), FALLBACK_EXTENSION);
    }

    #[test]
    fn test_keys() {
        let id = Uuid::parse_str("cf5160c2-27b7-4a50-9f8d-3e9ace1f86df").unwrap();
        assert_eq!(
            video_key(AspectRatio::Portrait, &id),
            "portrait/cf5160c2-27b7-4a50-9f8d-3e9ace1f86df.mp4"
        );
        assert_eq!(thumbnail_key(&id, "image/png"), "cf5160c2-27b7-4a50-9f8d-3e9ace1f86df.png");
        assert_eq!(
            thumbnail_key(&id, "application/x-unknown"),
            "cf5160c2-27b7-4a50-9f8d-3e9ace1f86df.bin"
        );
    }
}
