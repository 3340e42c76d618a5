//! Live edge coordination
//!
//! Sequence numbers for an in-progress stream derive purely from the wall
//! clock and the chunk duration, so every node computes the same edge
//! without shared state. Clients lagging too far behind the edge are
//! redirected forward instead of being served stale chunks.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Latency beyond which a client is redirected toward the edge
pub const CATCHUP_THRESHOLD: Duration = Duration::from_secs(30);

/// How many sequences behind the edge a redirected client lands
pub const CATCHUP_REWIND_SEQUENCES: u64 = 15;

/// The sequence number being produced right now
pub fn current_sequence(segment_duration: Duration) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO);
    sequence_at(now, segment_duration)
}

/// Sequence number at a given instant since the epoch
pub fn sequence_at(since_epoch: Duration, segment_duration: Duration) -> u64 {
    since_epoch.as_secs() / segment_duration.as_secs().max(1)
}

/// How far a requested sequence lags the current edge
pub fn latency(
    current_sequence: u64,
    requested_sequence: u64,
    segment_duration: Duration,
) -> Duration {
    let behind = current_sequence.saturating_sub(requested_sequence);
    Duration::from_secs(segment_duration.as_secs().saturating_mul(behind))
}

/// Where to redirect a lagging client, if it lags enough
///
/// Returns the catch-up sequence (`current - 15`, about 30s behind the
/// edge) when the requested sequence is more than 30s stale, `None` when
/// the request can be served directly.
pub fn catchup_target(
    current_sequence: u64,
    requested_sequence: u64,
    segment_duration: Duration,
) -> Option<u64> {
    if latency(current_sequence, requested_sequence, segment_duration) > CATCHUP_THRESHOLD {
        Some(current_sequence.saturating_sub(CATCHUP_REWIND_SEQUENCES))
    } else {
        None
    }
}

/// Outcome of waiting for a not-yet-produced chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkWait {
    /// Chunk file exists
    Ready,
    /// Timeout elapsed before the pipeline produced the chunk
    TimedOut,
    /// Caller cancelled mid-wait; not an error
    Cancelled,
}

/// Bounded wait for a chunk the production pipeline has not written yet
///
/// Polls for existence at `poll_interval` up to `timeout`. The iteration
/// count is capped by `timeout / poll_interval`, so blocking time has a
/// provable upper bound. Cancellation is observed at every tick.
pub async fn await_chunk(
    path: &Path,
    poll_interval: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ChunkWait {
    let poll_interval = poll_interval.max(Duration::from_millis(1));
    let max_polls = (timeout.as_millis() / poll_interval.as_millis()).max(1);

    for _ in 0..=max_polls {
        if cancel.is_cancelled() {
            return ChunkWait::Cancelled;
        }

        match tokio::fs::try_exists(path).await {
            Ok(true) => return ChunkWait::Ready,
            Ok(false) => {}
            Err(err) => {
                debug!(path = %path.display(), "chunk existence probe failed: {}", err);
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return ChunkWait::Cancelled,
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }

    ChunkWait::TimedOut
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEG: Duration = Duration::from_secs(2);

    #[test]
    fn test_sequence_at() {
        assert_eq!(sequence_at(Duration::from_secs(0), SEG), 0);
        assert_eq!(sequence_at(Duration::from_secs(7), SEG), 3);
        assert_eq!(sequence_at(Duration::from_secs(80), SEG), 40);
    }

    #[test]
    fn test_latency_arithmetic() {
        assert_eq!(latency(40, 20, SEG), Duration::from_secs(40));
        assert_eq!(latency(40, 40, SEG), Duration::ZERO);
        // A requested sequence ahead of the edge has no latency.
        assert_eq!(latency(40, 45, SEG), Duration::ZERO);
    }

    #[test]
    fn test_catchup_redirect() {
        // 40s behind > 30s threshold: redirect to current - 15 = 25.
        assert_eq!(catchup_target(40, 20, SEG), Some(25));
    }

    #[test]
    fn test_no_catchup_within_threshold() {
        // Exactly 30s behind is not "more than 30s".
        assert_eq!(catchup_target(40, 25, SEG), None);
        assert_eq!(catchup_target(40, 40, SEG), None);
    }

    #[tokio::test]
    async fn test_await_chunk_ready_immediately() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let result = await_chunk(
            tmp.path(),
            Duration::from_millis(100),
            Duration::from_secs(10),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(result, ChunkWait::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_chunk_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("chunk_0000000001.ts");

        let result = await_chunk(
            &missing,
            Duration::from_millis(100),
            Duration::from_secs(10),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(result, ChunkWait::TimedOut);
    }

    #[tokio::test]
    async fn test_await_chunk_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("chunk_0000000001.ts");

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = await_chunk(
            &missing,
            Duration::from_millis(100),
            Duration::from_secs(10),
            &cancel,
        )
        .await;
        assert_eq!(result, ChunkWait::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_chunk_sees_late_arrival() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunk_0000000002.ts");

        let writer = {
            let path = path.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(350)).await;
                tokio::fs::write(&path, b"ts").await.unwrap();
            })
        };

        let result = await_chunk(
            &path,
            Duration::from_millis(100),
            Duration::from_secs(10),
            &CancellationToken::new(),
        )
        .await;
        writer.await.unwrap();
        assert_eq!(result, ChunkWait::Ready);
    }
}
