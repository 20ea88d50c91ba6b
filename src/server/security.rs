//! Response hardening and per-client request limits

use crate::config::RateLimitConfig;
use anyhow::{Context, Result, bail};
use axum::Router;
use axum::http::{HeaderName, HeaderValue, header};
use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_http::set_header::SetResponseHeaderLayer;

/// Headers added to every response that does not already carry them
const SECURITY_HEADERS: [(HeaderName, &str); 9] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::X_DNS_PREFETCH_CONTROL, "off"),
    (header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"),
    (header::REFERRER_POLICY, "no-referrer"),
    (header::X_XSS_PROTECTION, "0"),
    (HeaderName::from_static("x-download-options"), "noopen"),
    (HeaderName::from_static("x-permitted-cross-domain-policies"), "none"),
    (HeaderName::from_static("origin-agent-cluster"), "?1"),
];

pub fn with_security_headers(mut app: Router) -> Router {
    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }
    app
}

/// Interval after which one request of a client's quota is given back
fn replenish_period(limits: &RateLimitConfig) -> Result<Duration> {
    if limits.max_requests == 0 || limits.window_secs == 0 {
        bail!("rate limit needs a non-zero max_requests and window_secs");
    }
    let window = Duration::from_secs(limits.window_secs);
    Ok(window / limits.max_requests)
}

/// Limit each client to `max_requests` per window.
///
/// Clients are keyed by `X-Forwarded-For`/`X-Real-IP`/`Forwarded` when a
/// proxy sets them, otherwise by peer address.
pub fn with_rate_limit(app: Router, limits: &RateLimitConfig) -> Result<Router> {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .period(replenish_period(limits)?)
        .burst_size(limits.max_requests)
        .finish()
        .context("invalid rate limit settings")?;

    tracing::debug!(
        max_requests = limits.max_requests,
        window_secs = limits.window_secs,
        "rate limiting enabled"
    );
    Ok(app.layer(GovernorLayer::new(Arc::new(governor))))
}
