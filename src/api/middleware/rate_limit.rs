//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

type IpGovernorLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a rate limiter for the public redirect and health endpoints.
///
/// # Limits
///
/// - **Rate**: 20 requests per second (one token every 50ms)
/// - **Burst**: 200 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Keys are the
/// socket peer address, so the server must be started with connect info.
pub fn layer() -> IpGovernorLayer {
    build(50, 200)
}

/// Creates a stricter rate limiter for the management API.
///
/// # Limits
///
/// - **Rate**: 2 requests per second (one token every 500ms)
/// - **Burst**: 30 requests
pub fn secure_layer() -> IpGovernorLayer {
    build(500, 30)
}

/// `replenish_ms` is the interval after which one token is restored.
fn build(replenish_ms: u64, burst: u32) -> IpGovernorLayer {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(burst)
            .finish()
            .expect("non-zero rate limit parameters"),
    );

    GovernorLayer::new(governor_conf)
}
