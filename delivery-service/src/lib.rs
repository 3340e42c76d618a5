//! Delivery Service
//!
//! Adaptive bitrate delivery engine: byte-range resolution, throttled
//! chunked delivery, ABR quality selection, playlist synthesis, live-edge
//! sequencing, and preload scheduling. Media files are produced by an
//! external processing pipeline; this service only addresses, paces, and
//! serves them.

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
