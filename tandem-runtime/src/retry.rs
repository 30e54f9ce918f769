//! Bounded-retry execution with cancellation and span instrumentation

use crate::telemetry::{AttributeValue, LazyAttributes, Span, Tracer};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tandem_core::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Additional attempts after the first failure; 0 disables retries
    pub max_retries: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Backoff before retry number `retry` (zero-based)
    fn backoff(&self, retry: u32) -> Duration {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let backoff = {
            let base = self.initial_backoff.as_millis() as f64;
            Duration::from_millis((base * self.backoff_multiplier.powi(retry as i32)) as u64)
        };
        std::cmp::min(backoff, self.max_backoff)
    }
}

/// Runs provider round trips under a bounded-retry, cancellable,
/// instrumented envelope.
///
/// The whole operation is wrapped in an outer span; every round trip gets
/// its own inner span parented on it. Only [`Error::Transient`] failures
/// are retried, and the final failure is surfaced unchanged. The
/// cancellation token is honored before every attempt, during the attempt
/// itself, and during backoff sleeps.
pub struct Executor {
    config: RetryConfig,
    tracer: Arc<dyn Tracer>,
    token: CancellationToken,
}

impl Executor {
    /// Create an executor from its three collaborators
    pub fn new(config: RetryConfig, tracer: Arc<dyn Tracer>, token: CancellationToken) -> Self {
        Self {
            config,
            tracer,
            token,
        }
    }

    /// Run `body` under the full envelope.
    ///
    /// `body` must perform exactly one provider round trip per call; it is
    /// called again for each retry attempt.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: &str,
        attributes: LazyAttributes,
        body: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with(operation, attributes, body, |_| Vec::new())
            .await
    }

    /// Like [`Executor::execute`], additionally recording result attributes
    /// on success.
    ///
    /// `result_attributes` is invoked only when the tracer is enabled, so
    /// serializing the result costs nothing otherwise.
    pub async fn execute_with<T, F, Fut, R>(
        &self,
        operation: &str,
        attributes: LazyAttributes,
        mut body: F,
        result_attributes: R,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        R: FnOnce(&T) -> Vec<(String, AttributeValue)>,
    {
        let enabled = self.tracer.enabled();
        let resolved = if enabled {
            attributes.resolve()
        } else {
            Vec::new()
        };

        let outer = self.tracer.start_span(operation, None, resolved);
        let outcome = self.run_attempts(operation, outer.as_ref(), &mut body).await;

        if enabled {
            if let Ok(value) = &outcome {
                let attributes = result_attributes(value);
                if !attributes.is_empty() {
                    outer.set_attributes(attributes);
                }
            }
        }
        outer.end();
        outcome
    }

    async fn run_attempts<T, F, Fut>(
        &self,
        operation: &str,
        outer: &dyn Span,
        body: &mut F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let call_name = format!("{operation}.call");
        let mut retries = 0u32;

        loop {
            if self.token.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let inner = self.tracer.start_span(&call_name, Some(outer), Vec::new());
            let result = tokio::select! {
                () = self.token.cancelled() => Err(Error::Cancelled),
                result = body() => result,
            };
            inner.end();

            let error = match result {
                Ok(value) => {
                    if retries > 0 {
                        debug!(retries, operation, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if matches!(error, Error::Cancelled) {
                return Err(error);
            }
            if !error.is_retryable() {
                debug!(error = %error, operation, "error is not retryable");
                return Err(error);
            }
            if retries >= self.config.max_retries {
                warn!(
                    retries,
                    error = %error,
                    operation,
                    "retry budget exhausted"
                );
                return Err(error);
            }

            let delay = error
                .retry_after()
                .unwrap_or_else(|| self.config.backoff(retries));
            warn!(
                retry = retries + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                operation,
                "transient failure, retrying"
            );
            retries += 1;

            tokio::select! {
                () = self.token.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{NoopTracer, RecordingTracer, SpanEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    fn executor(config: RetryConfig) -> (Executor, RecordingTracer) {
        let tracer = RecordingTracer::new();
        let executor = Executor::new(
            config,
            Arc::new(tracer.clone()),
            CancellationToken::new(),
        );
        (executor, tracer)
    }

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(10),
            backoff_multiplier: 2.0,
        }
    }

    /// Body that fails transiently `failures` times, then succeeds.
    fn flaky_body(
        failures: usize,
    ) -> (
        Arc<AtomicUsize>,
        impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<usize>> + Send>>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let body = move || -> std::pin::Pin<Box<dyn Future<Output = Result<usize>> + Send>> {
            let calls = Arc::clone(&counter);
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    Err(Error::transient(format!("failure {n}")))
                } else {
                    Ok(n)
                }
            })
        };
        (calls, body)
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.initial_backoff, Duration::from_millis(100));
        assert_eq!(config.max_backoff, Duration::from_secs(30));
        assert_eq!(config.backoff_multiplier, 2.0);
    }

    #[test]
    fn test_calculate_backoff() {
        let config = RetryConfig {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        };

        assert_eq!(config.backoff(0), Duration::from_millis(100));
        assert_eq!(config.backoff(1), Duration::from_millis(200));
        assert_eq!(config.backoff(2), Duration::from_millis(400));
        // Large retry numbers are capped at max_backoff.
        assert_eq!(config.backoff(10), Duration::from_secs(10));
    }

    #[test_log::test(tokio::test)]
    async fn test_success_on_first_attempt() {
        let (executor, _) = executor(fast_config(2));
        let (calls, body) = flaky_body(0);

        let result = executor
            .execute("op", LazyAttributes::new(), body)
            .await
            .unwrap();

        assert_eq!(result, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_success_after_exactly_budgeted_failures() {
        // K transient failures with max_retries = K: succeeds, K+1 calls.
        let (executor, _) = executor(fast_config(2));
        let (calls, body) = flaky_body(2);

        let result = executor
            .execute("op", LazyAttributes::new(), body)
            .await
            .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_exhaustion_propagates_last_error_unchanged() {
        // K failures with max_retries = K-1: last error surfaces as-is.
        let (executor, _) = executor(fast_config(1));
        let (calls, body) = flaky_body(5);

        let error = executor
            .execute("op", LazyAttributes::new(), body)
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(error.to_string(), "transient failure: failure 1");
    }

    #[test_log::test(tokio::test)]
    async fn test_zero_max_retries_disables_retries() {
        let (executor, _) = executor(fast_config(0));
        let (calls, body) = flaky_body(1);

        let result = executor.execute("op", LazyAttributes::new(), body).await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_non_retryable_error_fails_immediately() {
        let (executor, _) = executor(fast_config(5));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<()> = executor
            .execute("op", LazyAttributes::new(), move || {
                let calls = Arc::clone(&counter);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(Error::UnsupportedContent("file part".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(Error::UnsupportedContent(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_cancellation_before_first_attempt() {
        let token = CancellationToken::new();
        token.cancel();
        let executor = Executor::new(fast_config(2), Arc::new(NoopTracer), token);
        let (calls, body) = flaky_body(0);

        let result = executor.execute("op", LazyAttributes::new(), body).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_cancellation_during_backoff() {
        let token = CancellationToken::new();
        let executor = Executor::new(
            RetryConfig {
                max_retries: 5,
                initial_backoff: Duration::from_secs(60),
                max_backoff: Duration::from_secs(60),
                backoff_multiplier: 1.0,
            },
            Arc::new(NoopTracer),
            token.clone(),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cancel = token.clone();
        let result: Result<()> = executor
            .execute("op", LazyAttributes::new(), move || {
                let calls = Arc::clone(&counter);
                let cancel = cancel.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    // Give up while the executor is about to back off.
                    cancel.cancel();
                    Err(Error::transient("flaky"))
                }
            })
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_retry_after_overrides_backoff() {
        let (executor, _) = executor(fast_config(1));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let start = Instant::now();
        let result = executor
            .execute("op", LazyAttributes::new(), move || {
                let calls = Arc::clone(&counter);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(Error::Transient {
                            message: "rate limited".into(),
                            retry_after: Some(Duration::from_millis(50)),
                            source: None,
                        })
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        let elapsed = start.elapsed();

        assert!(result.is_ok());
        assert!(elapsed >= Duration::from_millis(50));
    }

    #[test_log::test(tokio::test)]
    async fn test_span_nesting_per_attempt() {
        let (executor, tracer) = executor(fast_config(1));
        let (_, body) = flaky_body(1);

        executor
            .execute("tandem.invoke", LazyAttributes::new(), body)
            .await
            .unwrap();

        let events = tracer.events();
        assert_eq!(
            events,
            vec![
                SpanEvent::Start {
                    name: "tandem.invoke".into(),
                    parent: None,
                    attributes: Vec::new(),
                },
                SpanEvent::Start {
                    name: "tandem.invoke.call".into(),
                    parent: Some("tandem.invoke".into()),
                    attributes: Vec::new(),
                },
                SpanEvent::End {
                    name: "tandem.invoke.call".into()
                },
                SpanEvent::Start {
                    name: "tandem.invoke.call".into(),
                    parent: Some("tandem.invoke".into()),
                    attributes: Vec::new(),
                },
                SpanEvent::End {
                    name: "tandem.invoke.call".into()
                },
                SpanEvent::End {
                    name: "tandem.invoke".into()
                },
            ]
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_result_attributes_recorded_on_success() {
        let (executor, tracer) = executor(fast_config(0));
        let (_, body) = flaky_body(0);

        executor
            .execute_with("op", LazyAttributes::new(), body, |value| {
                vec![("result".to_string(), AttributeValue::Int(*value as i64))]
            })
            .await
            .unwrap();

        let events = tracer.events();
        assert!(events.contains(&SpanEvent::Attributes {
            name: "op".into(),
            attributes: vec![("result".to_string(), AttributeValue::Int(0))],
        }));
    }

    #[test_log::test(tokio::test)]
    async fn test_disabled_tracer_never_evaluates_thunks() {
        let executor = Executor::new(
            fast_config(0),
            Arc::new(NoopTracer),
            CancellationToken::new(),
        );
        let evaluations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&evaluations);
        let attributes = LazyAttributes::new().with("expensive", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(AttributeValue::Bool(true))
        });

        let (_, body) = flaky_body(0);
        executor.execute("op", attributes, body).await.unwrap();

        assert_eq!(evaluations.load(Ordering::SeqCst), 0);
    }
}
