//! Instrumented retry execution for the Tandem pipeline
//!
//! Provides the execution envelope every outbound capability call runs in:
//! bounded retries with exponential backoff, cooperative cancellation, and
//! nested observability spans whose attributes are computed lazily.

pub mod retry;
pub mod telemetry;

pub use retry::{Executor, RetryConfig};
pub use telemetry::{
    AttributeValue, LazyAttributes, LogTracer, NoopTracer, RecordingTracer, Span, SpanEvent,
    Tracer,
};
