/*!
 * Request Tracing
 * Structured tracing for sched requests using the tracing crate
 *
 * Features:
 * - Trace ID per request for correlation across resolver and engine logs
 * - JSON-formatted logs for structured parsing
 * - Outcome and duration recorded on the request span
 */

use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Environment variable enabling JSON log output
pub const ENV_TRACE_JSON: &str = "GPU_SCHED_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - GPU_SCHED_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one sched request from privilege check to engine return
pub struct OverrideSpan {
    span: tracing::Span,
    start: Instant,
    op: &'static str,
    trace_id: String,
}

impl OverrideSpan {
    pub fn new(op: &'static str, pid: u32) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "sched_request",
            trace_id = %trace_id,
            op = op,
            pid = pid,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
            contexts = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            op,
            trace_id,
        }
    }

    /// Get the trace ID for this request
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Record how many contexts the request touched
    pub fn record_contexts(&self, count: usize) {
        self.span.record("contexts", count as u64);
    }

    /// Record the request result
    pub fn record_result(&self, success: bool) {
        self.span
            .record("result", if success { "success" } else { "error" });
    }

    /// Record an error
    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }
}

impl Drop for OverrideSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration.as_millis() > 10 {
            // Only process_override can get here, on a connection with many contexts
            warn!(
                trace_id = %self.trace_id,
                op = self.op,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow sched request"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                op = self.op,
                duration_us = duration.as_micros() as u64,
                "sched request completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_trace_ids_are_unique() {
        let a = generate_trace_id();
        let b = generate_trace_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_span_records() {
        let span = OverrideSpan::new("process_override", 42);
        span.record_contexts(3);
        span.record_result(true);
        assert!(!span.trace_id().is_empty());
    }

    #[test]
    #[serial]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        // Second installation is refused instead of panicking
        assert!(!init_tracing());
    }
}
