/// HLS playlist synthesis for adaptive bitrate delivery
///
/// Master playlists are filtered by device capability and optionally
/// narrowed to a preferred codec; variant playlists enumerate segment
/// addresses for one tier. Line layout is byte-significant for player
/// compatibility: header markers first, then per-tier attribute/path
/// pairs with attribute keys in a fixed order.
use tracing::debug;

use crate::services::abr::{is_quality_supported, DeviceCapabilities};
use crate::services::catalog::{Codec, QualityTier};

/// Playlist generation settings
#[derive(Debug, Clone)]
pub struct PlaylistConfig {
    /// On-demand segment duration in seconds
    pub segment_duration_seconds: u32,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            segment_duration_seconds: 10,
        }
    }
}

/// Playlist builder for one deployment's segment layout
pub struct PlaylistBuilder {
    config: PlaylistConfig,
}

impl PlaylistBuilder {
    pub fn new(config: PlaylistConfig) -> Self {
        Self { config }
    }

    pub fn segment_duration_seconds(&self) -> u32 {
        self.config.segment_duration_seconds
    }

    /// Build the master playlist for a title
    ///
    /// Tiers the device cannot play are dropped. If any surviving tier
    /// uses `preferred_codec`, tiers with other codecs are dropped too;
    /// otherwise the preference is ignored. Output is sorted by
    /// descending bitrate.
    pub fn build_master_playlist(
        &self,
        title_id: &str,
        tiers: &[QualityTier],
        caps: &DeviceCapabilities,
        preferred_codec: Option<Codec>,
    ) -> String {
        let mut eligible: Vec<&QualityTier> = tiers
            .iter()
            .filter(|tier| is_quality_supported(tier, caps))
            .collect();

        if let Some(preferred) = preferred_codec {
            if eligible.iter().any(|tier| tier.codec == preferred) {
                eligible.retain(|tier| tier.codec == preferred);
            }
        }

        eligible.sort_by(|a, b| b.bitrate_bps.cmp(&a.bitrate_bps));

        debug!(
            title_id,
            tiers = eligible.len(),
            "generating master playlist"
        );

        let mut playlist = String::from("#EXTM3U\n");
        playlist.push_str("#EXT-X-VERSION:3\n");
        playlist.push_str("#EXT-X-INDEPENDENT-SEGMENTS\n");

        for tier in &eligible {
            playlist.push_str(&format!(
                "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}x{},CODECS=\"{}\",FRAME-RATE={:.3}\n",
                tier.bitrate_bps, tier.width, tier.height, tier.codec_string, tier.frame_rate
            ));
            playlist.push_str(&format!("/playlist/{}/{}.m3u8\n", title_id, tier.label));
        }

        playlist
    }

    /// Build the variant playlist for one tier of a title
    ///
    /// A start offset skips whole segments from the front. VOD playlists
    /// are terminated with `#EXT-X-ENDLIST`; live variants never emit the
    /// terminator and are assembled by the live coordinator's caller, not
    /// here.
    pub fn build_variant_playlist(
        &self,
        title_id: &str,
        tier: &QualityTier,
        start_offset_seconds: Option<f64>,
        segment_duration_override: Option<u32>,
    ) -> String {
        let segment_duration = segment_duration_override
            .filter(|d| *d > 0)
            .unwrap_or(self.config.segment_duration_seconds);
        let total_segments =
            (tier.duration_seconds / segment_duration as f64).ceil() as u64;
        let start_segment = start_offset_seconds
            .map(|offset| (offset / segment_duration as f64).floor() as u64)
            .unwrap_or(0);

        debug!(
            title_id,
            quality = %tier.label,
            total_segments,
            start_segment,
            "generating variant playlist"
        );

        let mut playlist = String::from("#EXTM3U\n");
        playlist.push_str("#EXT-X-VERSION:3\n");
        playlist.push_str(&format!("#EXT-X-TARGETDURATION:{}\n", segment_duration));
        playlist.push_str("#EXT-X-MEDIA-SEQUENCE:0\n");

        for index in start_segment..total_segments {
            let segment_seconds = if index == total_segments - 1 {
                // Last segment carries the remainder
                tier.duration_seconds - (index * segment_duration as u64) as f64
            } else {
                segment_duration as f64
            };

            playlist.push_str(&format!("#EXTINF:{:.1},\n", segment_seconds));
            playlist.push_str(&format!(
                "/segment/{}/{}/{}.ts\n",
                title_id, tier.label, index
            ));
        }

        playlist.push_str("#EXT-X-ENDLIST\n");

        playlist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::default_tiers;

    fn builder() -> PlaylistBuilder {
        PlaylistBuilder::new(PlaylistConfig {
            segment_duration_seconds: 10,
        })
    }

    fn vp9_tier(label: &str, bitrate_bps: u64) -> QualityTier {
        QualityTier {
            label: label.to_string(),
            width: 1280,
            height: 720,
            bitrate_bps,
            codec: Codec::Vp9,
            frame_rate: 30.0,
            duration_seconds: 60.0,
            codec_string: "vp09.00.31.08".to_string(),
        }
    }

    #[test]
    fn test_master_header_layout() {
        let playlist = builder().build_master_playlist(
            "title1",
            &default_tiers(60.0),
            &DeviceCapabilities::default(),
            None,
        );

        let lines: Vec<&str> = playlist.lines().collect();
        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(lines[1], "#EXT-X-VERSION:3");
        assert_eq!(lines[2], "#EXT-X-INDEPENDENT-SEGMENTS");
        assert!(lines[3].starts_with("#EXT-X-STREAM-INF:BANDWIDTH="));
    }

    #[test]
    fn test_master_sorted_descending_by_bitrate() {
        let playlist = builder().build_master_playlist(
            "title1",
            &default_tiers(60.0),
            &DeviceCapabilities::default(),
            None,
        );

        let bandwidths: Vec<u64> = playlist
            .lines()
            .filter(|l| l.starts_with("#EXT-X-STREAM-INF"))
            .map(|l| {
                l.split("BANDWIDTH=")
                    .nth(1)
                    .unwrap()
                    .split(',')
                    .next()
                    .unwrap()
                    .parse()
                    .unwrap()
            })
            .collect();

        let mut sorted = bandwidths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(bandwidths, sorted);
    }

    #[test]
    fn test_master_attribute_order() {
        let playlist = builder().build_master_playlist(
            "title1",
            &default_tiers(60.0),
            &DeviceCapabilities::default(),
            None,
        );

        let stream_inf = playlist
            .lines()
            .find(|l| l.starts_with("#EXT-X-STREAM-INF"))
            .unwrap();
        let bandwidth_pos = stream_inf.find("BANDWIDTH=").unwrap();
        let resolution_pos = stream_inf.find("RESOLUTION=").unwrap();
        let codecs_pos = stream_inf.find("CODECS=").unwrap();
        let frame_rate_pos = stream_inf.find("FRAME-RATE=").unwrap();
        assert!(bandwidth_pos < resolution_pos);
        assert!(resolution_pos < codecs_pos);
        assert!(codecs_pos < frame_rate_pos);
    }

    #[test]
    fn test_master_filters_unsupported_tiers() {
        let caps = analyze_mobile();
        let playlist = builder().build_master_playlist(
            "title1",
            &default_tiers(60.0),
            &caps,
            None,
        );

        // Mobile cap is 720p/2Mbps: 720p (2.8Mbps) and 1080p are dropped.
        assert!(playlist.contains("/playlist/title1/480p.m3u8"));
        assert!(playlist.contains("/playlist/title1/360p.m3u8"));
        assert!(!playlist.contains("720p.m3u8"));
        assert!(!playlist.contains("1080p.m3u8"));
    }

    fn analyze_mobile() -> DeviceCapabilities {
        crate::services::abr::analyze_device_capabilities(Some("Mobile"))
    }

    #[test]
    fn test_master_codec_narrowing_applies() {
        let mut tiers = default_tiers(60.0);
        tiers.push(vp9_tier("720p-vp9", 2_200_000));

        let playlist = builder().build_master_playlist(
            "title1",
            &tiers,
            &DeviceCapabilities::default(),
            Some(Codec::Vp9),
        );

        assert!(playlist.contains("720p-vp9"));
        assert!(!playlist.contains("CODECS=\"avc1"));
    }

    #[test]
    fn test_master_codec_narrowing_ignored_when_absent() {
        let playlist = builder().build_master_playlist(
            "title1",
            &default_tiers(60.0),
            &DeviceCapabilities::default(),
            Some(Codec::Av1),
        );

        // No AV1 tier survives filtering, so all tiers are kept.
        let stream_count = playlist.matches("#EXT-X-STREAM-INF").count();
        assert_eq!(stream_count, 4);
    }

    #[test]
    fn test_one_declaration_per_surviving_tier() {
        let playlist = builder().build_master_playlist(
            "title1",
            &default_tiers(60.0),
            &DeviceCapabilities::default(),
            None,
        );

        let declarations = playlist.matches("#EXT-X-STREAM-INF").count();
        let paths = playlist
            .lines()
            .filter(|l| l.starts_with("/playlist/"))
            .count();
        assert_eq!(declarations, 4);
        assert_eq!(paths, 4);
    }

    #[test]
    fn test_variant_header_and_terminator() {
        let tiers = default_tiers(30.0);
        let playlist = builder().build_variant_playlist("title1", &tiers[2], None, None);

        let lines: Vec<&str> = playlist.lines().collect();
        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(lines[1], "#EXT-X-VERSION:3");
        assert_eq!(lines[2], "#EXT-X-TARGETDURATION:10");
        assert_eq!(lines[3], "#EXT-X-MEDIA-SEQUENCE:0");
        assert_eq!(*lines.last().unwrap(), "#EXT-X-ENDLIST");
    }

    #[test]
    fn test_variant_segment_count() {
        let tiers = default_tiers(30.0);
        let playlist = builder().build_variant_playlist("title1", &tiers[0], None, None);
        assert_eq!(playlist.matches("#EXTINF").count(), 3);
        assert!(playlist.contains("/segment/title1/360p/0.ts"));
        assert!(playlist.contains("/segment/title1/360p/2.ts"));
    }

    #[test]
    fn test_variant_partial_last_segment() {
        let tiers = default_tiers(25.0);
        let playlist = builder().build_variant_playlist("title1", &tiers[0], None, None);
        assert_eq!(playlist.matches("#EXTINF").count(), 3);
        assert!(playlist.contains("#EXTINF:5.0,"));
    }

    #[test]
    fn test_variant_start_offset_skips_whole_segments() {
        let tiers = default_tiers(60.0);
        let playlist = builder().build_variant_playlist("title1", &tiers[0], Some(25.0), None);

        // floor(25 / 10) = 2: segments 0 and 1 are skipped.
        assert!(!playlist.contains("/segment/title1/360p/0.ts"));
        assert!(!playlist.contains("/segment/title1/360p/1.ts"));
        assert!(playlist.contains("/segment/title1/360p/2.ts"));
        assert_eq!(playlist.matches("#EXTINF").count(), 4);
    }
}
