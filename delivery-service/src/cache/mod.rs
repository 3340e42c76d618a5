/// Caching layer for delivery-service
///
/// This module handles:
/// - Compiled playlist caching (master and variant text)
/// - Compiled storyboard caching (sprite bytes)
///
/// Both caches are advisory and TTL-bounded. Entries are pure functions
/// of their key inputs, so duplicate computation under a racing miss is
/// harmless and last write wins on a key; no stampede lock is needed.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::RwLock;

const DEFAULT_PLAYLIST_TTL: Duration = Duration::from_secs(300);
const DEFAULT_STORYBOARD_TTL: Duration = Duration::from_secs(3600);

struct TtlCache<T> {
    entries: RwLock<HashMap<String, (Instant, T)>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    async fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let (stored_at, value) = entries.get(key)?;
        if stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(value.clone())
    }

    async fn insert(&self, key: String, value: T) {
        let mut entries = self.entries.write().await;
        // Opportunistic expiry sweep; the map only holds hot keys.
        let ttl = self.ttl;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(key, (Instant::now(), value));
    }
}

/// In-process cache for compiled delivery artifacts
pub struct DeliveryCache {
    playlists: TtlCache<String>,
    storyboards: TtlCache<Bytes>,
}

impl Default for DeliveryCache {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYLIST_TTL, DEFAULT_STORYBOARD_TTL)
    }
}

impl DeliveryCache {
    pub fn new(playlist_ttl: Duration, storyboard_ttl: Duration) -> Self {
        Self {
            playlists: TtlCache::new(playlist_ttl),
            storyboards: TtlCache::new(storyboard_ttl),
        }
    }

    /// Retrieve a compiled playlist if still fresh
    pub async fn get_playlist(&self, key: &str) -> Option<String> {
        self.playlists.get(key).await
    }

    /// Cache a compiled playlist
    pub async fn cache_playlist(&self, key: String, playlist: String) {
        self.playlists.insert(key, playlist).await;
    }

    /// Retrieve a compiled storyboard if still fresh
    pub async fn get_storyboard(&self, key: &str) -> Option<Bytes> {
        self.storyboards.get(key).await
    }

    /// Cache a compiled storyboard
    pub async fn cache_storyboard(&self, key: String, image: Bytes) {
        self.storyboards.insert(key, image).await;
    }

    pub fn master_playlist_key(title_id: &str, codec: &str, user_agent_class: &str) -> String {
        format!("playlist:master:{}:{}:{}", title_id, codec, user_agent_class)
    }

    pub fn variant_playlist_key(
        title_id: &str,
        quality: &str,
        start_segment: u64,
        segment_duration: u32,
    ) -> String {
        format!(
            "playlist:variant:{}:{}:{}:{}",
            title_id, quality, start_segment, segment_duration
        )
    }

    pub fn storyboard_key(title_id: &str, level: u32, format: &str) -> String {
        format!("storyboard:{}:{}:{}", title_id, level, format)
    }
}
