/// Throttled chunked delivery
///
/// Streams a byte range from a file in bounded chunks, pacing output to a
/// bandwidth cap. Pacing is average-rate: after each chunk the loop sleeps
/// only if delivery is running ahead of `bytes_sent * 8 / limit` seconds.
/// Cancellation is observed at the top of every iteration, so time-to-stop
/// is bounded by one chunk read plus one pace sleep.
use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, Stream};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::range::ByteRange;

/// Delivery pacing policy
#[derive(Debug, Clone, Copy)]
pub struct ThrottlePolicy {
    /// Bandwidth cap in bits/sec; 0 disables pacing
    pub bandwidth_limit_bps: u64,
    /// Bytes read and emitted per iteration; must be > 0
    pub chunk_size: usize,
}

impl ThrottlePolicy {
    pub fn unlimited(chunk_size: usize) -> Self {
        Self {
            bandwidth_limit_bps: 0,
            chunk_size,
        }
    }

    /// Seconds the transfer should have taken at the cap
    fn expected_elapsed(&self, bytes_sent: u64) -> Duration {
        Duration::from_secs_f64(bytes_sent as f64 * 8.0 / self.bandwidth_limit_bps as f64)
    }
}

struct DeliveryState {
    file: File,
    remaining: u64,
    bytes_sent: u64,
    started: Instant,
    policy: ThrottlePolicy,
    cancel: CancellationToken,
}

/// Open a file and stream `range` from it under `policy`
///
/// Whole-file delivery is the same call with `ByteRange::whole(length)`.
pub async fn open_throttled(
    path: &Path,
    range: ByteRange,
    policy: ThrottlePolicy,
    cancel: CancellationToken,
) -> std::io::Result<impl Stream<Item = std::io::Result<Bytes>>> {
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(range.start)).await?;
    Ok(throttled_stream(file, range, policy, cancel))
}

/// Stream a byte range from an already-positioned file
///
/// The file cursor must sit at `range.start`. Never holds more than one
/// chunk in memory. A cancelled token ends the stream without error;
/// partial delivery is an accepted outcome (client disconnect).
pub fn throttled_stream(
    file: File,
    range: ByteRange,
    policy: ThrottlePolicy,
    cancel: CancellationToken,
) -> impl Stream<Item = std::io::Result<Bytes>> {
    debug_assert!(policy.chunk_size > 0);

    let state = DeliveryState {
        file,
        remaining: range.len(),
        bytes_sent: 0,
        started: Instant::now(),
        policy,
        cancel,
    };

    stream::try_unfold(state, |mut st| async move {
        if st.remaining == 0 || st.cancel.is_cancelled() {
            if st.remaining > 0 {
                debug!(
                    bytes_sent = st.bytes_sent,
                    remaining = st.remaining,
                    "delivery cancelled mid-range"
                );
            }
            return Ok(None);
        }

        let to_read = st.remaining.min(st.policy.chunk_size as u64) as usize;
        let mut buf = vec![0u8; to_read];
        st.file.read_exact(&mut buf).await?;

        st.remaining -= to_read as u64;
        st.bytes_sent += to_read as u64;

        if st.policy.bandwidth_limit_bps > 0 {
            let expected = st.policy.expected_elapsed(st.bytes_sent);
            let elapsed = st.started.elapsed();
            if elapsed < expected {
                tokio::time::sleep(expected - elapsed).await;
            }
        }

        Ok(Some((Bytes::from(buf), st)))
    })
}
