//! Byte-range resolution and throttled chunked delivery
//!
//! The two halves of segment/file serving: `range` turns an HTTP `Range`
//! header into concrete byte ranges, `throttle` streams a resolved range
//! under a bandwidth cap with cooperative cancellation.

pub mod range;
pub mod throttle;

pub use range::{resolve_byte_ranges, ByteRange};
pub use throttle::{open_throttled, throttled_stream, ThrottlePolicy};
