/// Tag-based format addressing for the `/watch` surface
///
/// Formats are an alternate addressing scheme over the same quality tiers:
/// a numeric tag plus MIME/container metadata. Mapping between a format
/// and a tier is lossy in both directions, so both directions are explicit
/// named functions here and nothing converts implicitly.
use thiserror::Error;

use crate::services::catalog::{Codec, QualityTier};

/// A tag-addressed media format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub tag: u32,
    pub mime_type: &'static str,
    pub codec: Codec,
    pub container: &'static str,
    pub quality_label: &'static str,
}

/// No format satisfies the request
///
/// Surfaced explicitly rather than as a silent empty result; a missing
/// format must never propagate a null into delivery.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no format available for tag={tag:?} mime={mime:?}")]
pub struct NoFormatAvailable {
    pub tag: Option<u32>,
    pub mime: Option<String>,
}

/// The format table served by this deployment
pub const FORMATS: &[FormatDescriptor] = &[
    FormatDescriptor {
        tag: 18,
        mime_type: "video/mp4",
        codec: Codec::H264,
        container: "mp4",
        quality_label: "360p",
    },
    FormatDescriptor {
        tag: 59,
        mime_type: "video/mp4",
        codec: Codec::H264,
        container: "mp4",
        quality_label: "480p",
    },
    FormatDescriptor {
        tag: 22,
        mime_type: "video/mp4",
        codec: Codec::H264,
        container: "mp4",
        quality_label: "720p",
    },
    FormatDescriptor {
        tag: 37,
        mime_type: "video/mp4",
        codec: Codec::H264,
        container: "mp4",
        quality_label: "1080p",
    },
    FormatDescriptor {
        tag: 243,
        mime_type: "video/webm",
        codec: Codec::Vp9,
        container: "webm",
        quality_label: "360p",
    },
    FormatDescriptor {
        tag: 244,
        mime_type: "video/webm",
        codec: Codec::Vp9,
        container: "webm",
        quality_label: "480p",
    },
    FormatDescriptor {
        tag: 247,
        mime_type: "video/webm",
        codec: Codec::Vp9,
        container: "webm",
        quality_label: "720p",
    },
    FormatDescriptor {
        tag: 248,
        mime_type: "video/webm",
        codec: Codec::Vp9,
        container: "webm",
        quality_label: "1080p",
    },
];

/// Pick a format servable from the given tier set
///
/// Exact tag match first, then first MIME match, then best available
/// (highest-quality servable entry). Only formats that land on one of the
/// title's tiers count; when nothing lands, the outcome is an explicit
/// [`NoFormatAvailable`], never a silent empty result.
pub fn select_format(
    tag: Option<u32>,
    mime: Option<&str>,
    tiers: &[QualityTier],
) -> Result<&'static FormatDescriptor, NoFormatAvailable> {
    let servable = |f: &&'static FormatDescriptor| tier_for_format(f, tiers).is_some();

    if let Some(tag) = tag {
        if let Some(format) = FORMATS.iter().filter(servable).find(|f| f.tag == tag) {
            return Ok(format);
        }
    }

    if let Some(mime) = mime {
        if let Some(format) = FORMATS
            .iter()
            .filter(servable)
            .find(|f| f.mime_type == mime)
        {
            return Ok(format);
        }
    }

    // Unconstrained fallback: best available by quality label rank.
    FORMATS
        .iter()
        .filter(servable)
        .max_by_key(|f| quality_rank(f.quality_label))
        .ok_or_else(|| NoFormatAvailable {
            tag,
            mime: mime.map(|m| m.to_string()),
        })
}

fn quality_rank(label: &str) -> u32 {
    match label {
        "360p" => 1,
        "480p" => 2,
        "720p" => 3,
        "1080p" => 4,
        _ => 0,
    }
}

/// Map a format to the tier it addresses within a tier set
///
/// Lossy: the format's MIME type and container are dropped; only codec
/// and quality label participate in the match.
pub fn tier_for_format<'a>(
    format: &FormatDescriptor,
    tiers: &'a [QualityTier],
) -> Option<&'a QualityTier> {
    tiers
        .iter()
        .find(|tier| tier.label == format.quality_label && tier.codec == format.codec)
        .or_else(|| tiers.iter().find(|tier| tier.label == format.quality_label))
}

/// Map a tier to a format in the table
///
/// Lossy: the tier's bitrate, frame rate, duration, and codec string are
/// dropped; only label and codec participate in the match.
pub fn format_for_tier(tier: &QualityTier) -> Option<&'static FormatDescriptor> {
    FORMATS
        .iter()
        .find(|f| f.quality_label == tier.label && f.codec == tier.codec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::default_tiers;

    #[test]
    fn test_select_by_tag() {
        let tiers = default_tiers(60.0);
        let format = select_format(Some(22), None, &tiers).unwrap();
        assert_eq!(format.quality_label, "720p");
        assert_eq!(format.container, "mp4");
    }

    #[test]
    fn test_select_by_mime_when_tag_misses() {
        let tiers = default_tiers(60.0);
        let format = select_format(Some(9999), Some("video/webm"), &tiers).unwrap();
        assert_eq!(format.mime_type, "video/webm");
    }

    #[test]
    fn test_select_falls_back_to_best_available() {
        let tiers = default_tiers(60.0);
        let format = select_format(Some(9999), Some("video/x-flv"), &tiers).unwrap();
        assert_eq!(format.quality_label, "1080p");
    }

    #[test]
    fn test_no_format_available_for_empty_tier_set() {
        let err = select_format(Some(22), None, &[]).unwrap_err();
        assert_eq!(err.tag, Some(22));
    }

    #[test]
    fn test_no_format_available_for_unmapped_tiers() {
        let mut tier = default_tiers(60.0).remove(0);
        tier.label = "144p".to_string();
        let err = select_format(None, None, &[tier]).unwrap_err();
        assert_eq!(err.tag, None);
    }

    #[test]
    fn test_tier_for_format_matches_label_and_codec() {
        let tiers = default_tiers(60.0);
        let format = select_format(Some(22), None, &tiers).unwrap();
        let tier = tier_for_format(format, &tiers).unwrap();
        assert_eq!(tier.label, "720p");
        assert_eq!(tier.codec, Codec::H264);
    }

    #[test]
    fn test_tier_for_format_label_fallback_across_codecs() {
        // Catalog ladder is h264-only; a vp9 format still lands on the
        // tier with the same label (codec is part of what gets lost).
        let tiers = default_tiers(60.0);
        let format = select_format(Some(247), None, &tiers).unwrap();
        let tier = tier_for_format(format, &tiers).unwrap();
        assert_eq!(tier.label, "720p");
    }

    #[test]
    fn test_format_for_tier_is_lossy_on_bitrate() {
        let tiers = default_tiers(60.0);
        let format = format_for_tier(&tiers[2]).unwrap();
        assert_eq!(format.tag, 22);
        // Nothing on the descriptor carries the tier's bitrate.
        assert_eq!(format.quality_label, "720p");
    }

    #[test]
    fn test_unknown_tier_has_no_format() {
        let mut tier = default_tiers(60.0).remove(0);
        tier.label = "144p".to_string();
        assert!(format_for_tier(&tier).is_none());
    }
}
