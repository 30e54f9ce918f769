//! Per-invocation options

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tandem_core::ProviderOptions;
use tandem_runtime::{LogTracer, NoopTracer, RetryConfig, Tracer};
use tokio_util::sync::CancellationToken;

/// Options accepted by one pipeline invocation.
///
/// Everything here is per-call state: the retry budget, a cancellation
/// signal, opaque transport headers and provider options passed through to
/// the capability, and the telemetry switch.
#[derive(Clone)]
pub struct InvocationOptions {
    retry: RetryConfig,
    cancellation: CancellationToken,
    headers: HashMap<String, String>,
    provider_options: ProviderOptions,
    telemetry: bool,
    tracer: Option<Arc<dyn Tracer>>,
}

impl Default for InvocationOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            cancellation: CancellationToken::new(),
            headers: HashMap::new(),
            provider_options: ProviderOptions::default(),
            telemetry: false,
            tracer: None,
        }
    }
}

impl InvocationOptions {
    /// Create options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of additional attempts after the first failure.
    ///
    /// Defaults to 2; 0 disables retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Replace the whole retry configuration
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Supply a cancellation token the caller may trigger
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Add one opaque transport header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the opaque provider options passed through to the capability
    pub fn with_provider_options(mut self, provider_options: ProviderOptions) -> Self {
        self.provider_options = provider_options;
        self
    }

    /// Enable or disable telemetry.
    ///
    /// Disabled by default. While disabled, span-attribute thunks are never
    /// evaluated.
    pub fn with_telemetry(mut self, enabled: bool) -> Self {
        self.telemetry = enabled;
        self
    }

    /// Inject a tracer; implies enabling telemetry
    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self.telemetry = true;
        self
    }

    /// The retry configuration for this invocation
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// The cancellation token for this invocation
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Opaque transport headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Opaque provider options
    pub fn provider_options(&self) -> &ProviderOptions {
        &self.provider_options
    }

    /// Whether telemetry is enabled
    pub fn telemetry_enabled(&self) -> bool {
        self.telemetry
    }

    /// The tracer this invocation reports to.
    ///
    /// Telemetry off yields a [`NoopTracer`]; telemetry on without an
    /// injected tracer yields a [`LogTracer`].
    pub fn tracer(&self) -> Arc<dyn Tracer> {
        if !self.telemetry {
            return Arc::new(NoopTracer);
        }
        match &self.tracer {
            Some(tracer) => Arc::clone(tracer),
            None => Arc::new(LogTracer),
        }
    }
}

impl fmt::Debug for InvocationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationOptions")
            .field("retry", &self.retry)
            .field("headers", &self.headers)
            .field("provider_options", &self.provider_options)
            .field("telemetry", &self.telemetry)
            .field("tracer", &self.tracer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_runtime::RecordingTracer;

    #[test]
    fn test_defaults() {
        let options = InvocationOptions::default();
        assert_eq!(options.retry_config().max_retries, 2);
        assert!(options.headers().is_empty());
        assert!(options.provider_options().is_empty());
        assert!(!options.telemetry_enabled());
        assert!(!options.cancellation().is_cancelled());
    }

    #[test]
    fn test_builder_methods() {
        let options = InvocationOptions::new()
            .with_max_retries(5)
            .with_header("x-request-id", "abc")
            .with_telemetry(true);

        assert_eq!(options.retry_config().max_retries, 5);
        assert_eq!(
            options.headers().get("x-request-id").map(String::as_str),
            Some("abc")
        );
        assert!(options.telemetry_enabled());
    }

    #[test]
    fn test_tracer_selection() {
        // Telemetry off: the tracer reports itself disabled.
        assert!(!InvocationOptions::default().tracer().enabled());

        // Telemetry on without an injected tracer: enabled default sink.
        assert!(InvocationOptions::new()
            .with_telemetry(true)
            .tracer()
            .enabled());

        // Injecting a tracer implies enabling telemetry.
        let options = InvocationOptions::new().with_tracer(Arc::new(RecordingTracer::new()));
        assert!(options.telemetry_enabled());
        assert!(options.tracer().enabled());
    }
}
