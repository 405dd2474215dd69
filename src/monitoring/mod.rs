/*!
 * Monitoring
 * Structured tracing for the override path
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, OverrideSpan};
