/// Playback analytics boundary
///
/// Per-session playback stats reported by clients. Persistence lives in an
/// external analytics collaborator; in-core this is a concurrency-safe
/// keyed store with explicit last-writer-wins semantics per session id.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

/// Latest reported playback state for one session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaybackStats {
    pub session_id: String,
    pub title_id: Option<String>,
    pub current_quality: Option<String>,
    pub bandwidth_estimate_bps: Option<u64>,
    pub buffer_level_seconds: Option<f64>,
    pub playback_position_seconds: Option<f64>,
    pub dropped_frames: Option<u64>,
    pub reported_at: DateTime<Utc>,
}

/// Keyed session store, last writer wins per session id
#[derive(Default)]
pub struct SessionStatsStore {
    sessions: RwLock<HashMap<String, PlaybackStats>>,
}

impl SessionStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a report, replacing whatever the session held before
    pub async fn record(&self, stats: PlaybackStats) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(stats.session_id.clone(), stats);
    }

    /// Latest report for a session, if any
    pub async fn get(&self, session_id: &str) -> Option<PlaybackStats> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Number of sessions currently tracked
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
