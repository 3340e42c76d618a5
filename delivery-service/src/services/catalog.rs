/// Title catalog and media store boundary
///
/// The external processing pipeline writes segment files at well-known
/// paths under a media root; persistent catalog storage lives elsewhere.
/// This module is the in-core view of both: tier metadata per title and
/// path/length resolution for the files the pipeline produced.
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Video codec identifiers understood by the delivery engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    H264,
    Vp9,
    Av1,
}

impl Codec {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "h264" | "avc" | "avc1" => Some(Self::H264),
            "vp9" => Some(Self::Vp9),
            "av1" | "av01" => Some(Self::Av1),
            _ => None,
        }
    }
}

/// One quality variant of a title
///
/// Tiers of the same title are unique by label and share the title's
/// duration. Bitrate is bits/sec; `codec_string` is the container-level
/// descriptor emitted into playlists.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityTier {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub bitrate_bps: u64,
    pub codec: Codec,
    pub frame_rate: f32,
    pub duration_seconds: f64,
    pub codec_string: String,
}

/// The standard encoding ladder the pipeline produces for every title
pub fn default_tiers(duration_seconds: f64) -> Vec<QualityTier> {
    vec![
        QualityTier {
            label: "360p".to_string(),
            width: 640,
            height: 360,
            bitrate_bps: 800_000,
            codec: Codec::H264,
            frame_rate: 30.0,
            duration_seconds,
            codec_string: "avc1.4d401e,mp4a.40.2".to_string(),
        },
        QualityTier {
            label: "480p".to_string(),
            width: 854,
            height: 480,
            bitrate_bps: 1_400_000,
            codec: Codec::H264,
            frame_rate: 30.0,
            duration_seconds,
            codec_string: "avc1.4d401f,mp4a.40.2".to_string(),
        },
        QualityTier {
            label: "720p".to_string(),
            width: 1280,
            height: 720,
            bitrate_bps: 2_800_000,
            codec: Codec::H264,
            frame_rate: 30.0,
            duration_seconds,
            codec_string: "avc1.64001f,mp4a.40.2".to_string(),
        },
        QualityTier {
            label: "1080p".to_string(),
            width: 1920,
            height: 1080,
            bitrate_bps: 5_000_000,
            codec: Codec::H264,
            frame_rate: 30.0,
            duration_seconds,
            codec_string: "avc1.640028,mp4a.40.2".to_string(),
        },
    ]
}

/// Catalog lookup for title metadata
///
/// Single trait seam so deployments can plug a real metadata service in;
/// the default implementation derives everything from the media root.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Tier set for a title, or `None` when the title is unknown
    async fn tiers(&self, title_id: &str) -> Option<Vec<QualityTier>>;
}

/// Catalog backed by the media root directory layout
///
/// A title exists iff the pipeline created its directory; every title gets
/// the standard ladder with the configured default duration.
pub struct StaticCatalog {
    media_root: PathBuf,
    default_duration_seconds: f64,
}

impl StaticCatalog {
    pub fn new(media_root: PathBuf, default_duration_seconds: f64) -> Self {
        Self {
            media_root,
            default_duration_seconds,
        }
    }
}

#[async_trait]
impl VideoCatalog for StaticCatalog {
    async fn tiers(&self, title_id: &str) -> Option<Vec<QualityTier>> {
        if !is_valid_media_id(title_id) {
            return None;
        }
        let dir = self.media_root.join(title_id);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Some(default_tiers(self.default_duration_seconds)),
            _ => None,
        }
    }
}

/// Identifiers are path components; anything else is a traversal attempt.
pub fn is_valid_media_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Path and length resolution for pipeline-produced files
///
/// Addressing is byte-compatible with the pipeline output layout:
/// on-demand segments at `{title}/{quality}/segment_{index:06}.ts`, live
/// chunks at `live/{stream}/{quality}/chunk_{seq:010}.ts`.
#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn segment_path(&self, title_id: &str, quality: &str, index: u64) -> PathBuf {
        self.root
            .join(title_id)
            .join(quality)
            .join(format!("segment_{:06}.ts", index))
    }

    pub fn live_chunk_path(&self, stream_id: &str, quality: &str, sequence: u64) -> PathBuf {
        self.root
            .join("live")
            .join(stream_id)
            .join(quality)
            .join(format!("chunk_{:010}.ts", sequence))
    }

    pub fn progressive_path(&self, title_id: &str, quality: &str, container: &str) -> PathBuf {
        self.root
            .join(title_id)
            .join(quality)
            .join(format!("video.{}", container))
    }

    pub fn storyboard_path(&self, title_id: &str, level: u32, format: &str) -> PathBuf {
        self.root
            .join(title_id)
            .join(format!("storyboard_l{}.{}", level, format))
    }

    /// File length in bytes, or `None` when the file does not exist
    pub async fn resource_length(&self, path: &Path) -> std::io::Result<Option<u64>> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ladder_labels_unique_and_duration_shared() {
        let tiers = default_tiers(120.0);
        let labels: Vec<_> = tiers.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["360p", "480p", "720p", "1080p"]);
        assert!(tiers.iter().all(|t| t.duration_seconds == 120.0));
    }

    #[test]
    fn test_segment_path_convention() {
        let store = MediaStore::new(PathBuf::from("/var/media"));
        assert_eq!(
            store.segment_path("title1", "720p", 42),
            PathBuf::from("/var/media/title1/720p/segment_000042.ts")
        );
    }

    #[test]
    fn test_live_chunk_path_convention() {
        let store = MediaStore::new(PathBuf::from("/var/media"));
        assert_eq!(
            store.live_chunk_path("stream7", "480p", 12345),
            PathBuf::from("/var/media/live/stream7/480p/chunk_0000012345.ts")
        );
    }

    #[test]
    fn test_media_id_validation() {
        assert!(is_valid_media_id("video-123_abc"));
        assert!(!is_valid_media_id(""));
        assert!(!is_valid_media_id("../etc/passwd"));
        assert!(!is_valid_media_id("a/b"));
    }

    #[test]
    fn test_codec_parse() {
        assert_eq!(Codec::parse("h264"), Some(Codec::H264));
        assert_eq!(Codec::parse("avc1"), Some(Codec::H264));
        assert_eq!(Codec::parse("vp9"), Some(Codec::Vp9));
        assert_eq!(Codec::parse("mpeg2"), None);
    }

    #[tokio::test]
    async fn test_static_catalog_unknown_title() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = StaticCatalog::new(tmp.path().to_path_buf(), 300.0);
        assert!(catalog.tiers("missing").await.is_none());

        tokio::fs::create_dir(tmp.path().join("present"))
            .await
            .unwrap();
        let tiers = catalog.tiers("present").await.unwrap();
        assert_eq!(tiers.len(), 4);
    }
}
