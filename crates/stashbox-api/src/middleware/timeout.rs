//! Per-request deadline.

use std::time::Duration;

use tower_http::timeout::TimeoutLayer;

/// Requests running longer than `seconds` are answered with `408`.
pub fn build_timeout_layer(seconds: u64) -> TimeoutLayer {
    TimeoutLayer::new(Duration::from_secs(seconds.max(1)))
}
