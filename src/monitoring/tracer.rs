/*!
 * Structured Tracing
 * Subscriber setup and per-dispatch spans using the tracing crate
 *
 * Stdout carries the protocol, so every layer writes to stderr.
 */

use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Dispatches slower than this are logged at warn
const SLOW_DISPATCH_MS: u128 = 1_000;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - BRIDGE_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("BRIDGE_TRACE_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one envelope from lookup to delivery
pub struct DispatchSpan {
    span: Span,
    start: Instant,
    id: String,
    method: String,
}

impl DispatchSpan {
    pub fn new(id: &str, method: &str) -> Self {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            id = id,
            method = method,
            result = tracing::field::Empty,
            elapsed_ms = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            id: id.to_string(),
            method: method.to_string(),
        }
    }

    /// The underlying span, for `Instrument` on the handler future
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_result(&self, success: bool) {
        self.span.record("result", if success { "ok" } else { "error" });
    }
}

impl Drop for DispatchSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_millis();
        self.span.record("elapsed_ms", elapsed as u64);
        let _entered = self.span.enter();

        if elapsed > SLOW_DISPATCH_MS {
            warn!(
                id = %self.id,
                method = %self.method,
                elapsed_ms = elapsed as u64,
                slow = true,
                "slow dispatch"
            );
        } else {
            debug!(
                id = %self.id,
                method = %self.method,
                elapsed_ms = elapsed as u64,
                "dispatch completed"
            );
        }
    }
}

/// Convenience constructor used by the router
pub fn span_dispatch(id: &str, method: &str) -> DispatchSpan {
    DispatchSpan::new(id, method)
}
