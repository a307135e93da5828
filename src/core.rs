//! Core system components.
//!
//! Contains the request pipeline, the middleware stack, and the pingora
//! serving adapter.

pub mod middleware;
pub mod pipeline;
pub mod server;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
