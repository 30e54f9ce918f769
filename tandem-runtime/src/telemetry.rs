//! Telemetry seam: tracers, spans, and lazily computed attributes
//!
//! The executor reports what it does through an injected [`Tracer`].
//! Attributes are handed over as thunks so that expensive values — most
//! notably serialized request and response payloads — are only ever
//! computed when a tracer is actually enabled.

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A single span attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// A string value
    String(String),
    /// An integer value
    Int(i64),
    /// A floating-point value
    Float(f64),
    /// A boolean value
    Bool(bool),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(value) => write!(f, "{value}"),
            AttributeValue::Int(value) => write!(f, "{value}"),
            AttributeValue::Float(value) => write!(f, "{value}"),
            AttributeValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

type Thunk = Box<dyn Fn() -> Option<AttributeValue> + Send + Sync>;

/// An ordered set of lazily computed span attributes.
///
/// Each entry pairs a key with a thunk. Thunks run only inside
/// [`LazyAttributes::resolve`], which the executor calls exclusively for
/// enabled tracers; a disabled tracer costs nothing. A thunk returning
/// `None` marks an absent value and is skipped.
#[derive(Default)]
pub struct LazyAttributes {
    entries: Vec<(String, Thunk)>,
}

impl LazyAttributes {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lazily computed attribute, builder style
    pub fn with(
        mut self,
        key: impl Into<String>,
        thunk: impl Fn() -> Option<AttributeValue> + Send + Sync + 'static,
    ) -> Self {
        self.entries.push((key.into(), Box::new(thunk)));
        self
    }

    /// Add an attribute whose value is already at hand, builder style
    pub fn with_value(self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        let value = value.into();
        self.with(key, move || Some(value.clone()))
    }

    /// Whether no attributes were registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate every thunk, skipping absent values
    pub fn resolve(&self) -> Vec<(String, AttributeValue)> {
        self.entries
            .iter()
            .filter_map(|(key, thunk)| thunk().map(|value| (key.clone(), value)))
            .collect()
    }
}

impl fmt::Debug for LazyAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(key, _)| key))
            .finish()
    }
}

/// One observability record of a logical operation
pub trait Span: Send + Sync {
    /// The name this span was started with
    fn name(&self) -> &str;

    /// Attach resolved attributes to the span
    fn set_attributes(&self, attributes: Vec<(String, AttributeValue)>);

    /// Close the span
    fn end(&self);
}

/// Factory for spans.
///
/// Implementations must be safe for concurrent span emission from
/// independent invocations.
pub trait Tracer: Send + Sync {
    /// Whether attribute thunks should be evaluated at all
    fn enabled(&self) -> bool;

    /// Start a span, optionally parented on another span
    fn start_span(
        &self,
        name: &str,
        parent: Option<&dyn Span>,
        attributes: Vec<(String, AttributeValue)>,
    ) -> Box<dyn Span>;
}

/// Tracer that drops everything.
///
/// Reports itself as disabled, so attribute thunks are never evaluated.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

struct NoopSpan;

impl Span for NoopSpan {
    fn name(&self) -> &str {
        ""
    }

    fn set_attributes(&self, _attributes: Vec<(String, AttributeValue)>) {}

    fn end(&self) {}
}

impl Tracer for NoopTracer {
    fn enabled(&self) -> bool {
        false
    }

    fn start_span(
        &self,
        _name: &str,
        _parent: Option<&dyn Span>,
        _attributes: Vec<(String, AttributeValue)>,
    ) -> Box<dyn Span> {
        Box::new(NoopSpan)
    }
}

/// Tracer that emits span lifecycle as `tracing` events.
///
/// The default sink when telemetry is enabled and no tracer is injected.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

struct LogSpan {
    name: String,
}

impl Span for LogSpan {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_attributes(&self, attributes: Vec<(String, AttributeValue)>) {
        for (key, value) in attributes {
            debug!(
                target: "tandem::telemetry",
                span = %self.name,
                key = %key,
                value = %value,
                "span attribute"
            );
        }
    }

    fn end(&self) {
        debug!(target: "tandem::telemetry", span = %self.name, "span end");
    }
}

impl Tracer for LogTracer {
    fn enabled(&self) -> bool {
        true
    }

    fn start_span(
        &self,
        name: &str,
        parent: Option<&dyn Span>,
        attributes: Vec<(String, AttributeValue)>,
    ) -> Box<dyn Span> {
        match parent {
            Some(parent) => debug!(
                target: "tandem::telemetry",
                span = %name,
                parent = %parent.name(),
                "span start"
            ),
            None => debug!(target: "tandem::telemetry", span = %name, "span start"),
        }
        let span = LogSpan {
            name: name.to_string(),
        };
        span.set_attributes(attributes);
        Box::new(span)
    }
}

/// One recorded span lifecycle event
#[derive(Debug, Clone, PartialEq)]
pub enum SpanEvent {
    /// A span was started
    Start {
        /// Span name
        name: String,
        /// Name of the parent span, if any
        parent: Option<String>,
        /// Attributes resolved at start time
        attributes: Vec<(String, AttributeValue)>,
    },
    /// Attributes were attached after start
    Attributes {
        /// Span name
        name: String,
        /// The attached attributes
        attributes: Vec<(String, AttributeValue)>,
    },
    /// A span was closed
    End {
        /// Span name
        name: String,
    },
}

/// Tracer that records span lifecycle events in memory.
///
/// Lets callers inspect exactly what the executor emitted; the test suites
/// in this workspace are its main consumer.
#[derive(Debug, Default, Clone)]
pub struct RecordingTracer {
    events: Arc<Mutex<Vec<SpanEvent>>>,
}

struct RecordingSpan {
    name: String,
    events: Arc<Mutex<Vec<SpanEvent>>>,
}

impl RecordingTracer {
    /// Create a tracer with an empty event log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far
    pub fn events(&self) -> Vec<SpanEvent> {
        self.events
            .lock()
            .expect("recording tracer lock poisoned")
            .clone()
    }
}

impl Span for RecordingSpan {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_attributes(&self, attributes: Vec<(String, AttributeValue)>) {
        self.events
            .lock()
            .expect("recording tracer lock poisoned")
            .push(SpanEvent::Attributes {
                name: self.name.clone(),
                attributes,
            });
    }

    fn end(&self) {
        self.events
            .lock()
            .expect("recording tracer lock poisoned")
            .push(SpanEvent::End {
                name: self.name.clone(),
            });
    }
}

impl Tracer for RecordingTracer {
    fn enabled(&self) -> bool {
        true
    }

    fn start_span(
        &self,
        name: &str,
        parent: Option<&dyn Span>,
        attributes: Vec<(String, AttributeValue)>,
    ) -> Box<dyn Span> {
        self.events
            .lock()
            .expect("recording tracer lock poisoned")
            .push(SpanEvent::Start {
                name: name.to_string(),
                parent: parent.map(|span| span.name().to_string()),
                attributes,
            });
        Box::new(RecordingSpan {
            name: name.to_string(),
            events: Arc::clone(&self.events),
        })
    }
}
