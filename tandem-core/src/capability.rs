//! The capability contract consumed by the pipeline

use crate::error::Result;
use crate::types::metadata::{ProviderMetadata, ProviderOptions};
use crate::types::usage::Usage;
use async_trait::async_trait;
use std::collections::HashMap;

/// The capability contract version this pipeline speaks.
///
/// A capability reporting any other version is rejected before any
/// network-bound work begins.
pub const CAPABILITY_VERSION: &str = "v1";

/// One request handed to a capability
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityRequest<I> {
    /// The provider-ready input value
    pub input: I,
    /// Opaque transport headers passed through to the provider
    pub headers: HashMap<String, String>,
    /// Opaque provider options keyed by provider namespace
    pub provider_options: ProviderOptions,
}

impl<I> CapabilityRequest<I> {
    /// Create a request carrying only an input value
    pub fn new(input: I) -> Self {
        Self {
            input,
            headers: HashMap::new(),
            provider_options: ProviderOptions::default(),
        }
    }
}

/// Raw reply produced by one capability round trip
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityReply<P> {
    /// The produced payload
    pub payload: P,
    /// Resource usage reported by the provider
    pub usage: Usage,
    /// Response-side provider metadata, when reported
    pub provider_metadata: Option<ProviderMetadata>,
    /// Raw response details, when the transport retained them
    pub response: Option<ResponseInfo>,
}

impl<P> CapabilityReply<P> {
    /// Create a reply carrying only a payload, with usage unreported
    pub fn new(payload: P) -> Self {
        Self {
            payload,
            usage: Usage::unknown(),
            provider_metadata: None,
            response: None,
        }
    }

    /// Set the reported usage, builder style
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }
}

/// Details of the raw provider response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseInfo {
    /// Provider-assigned response ID
    pub id: Option<String>,
    /// Model that actually served the call
    pub model: Option<String>,
    /// Raw response body, when the transport retained it
    pub body: Option<serde_json::Value>,
}

/// The abstract invocable unit: one versioned remote operation.
///
/// Implementations perform exactly one provider round trip per `invoke`
/// call; retries, cancellation, and instrumentation are the pipeline's
/// responsibility, not the capability's.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Provider-ready input this capability accepts
    type Input: Send + 'static;
    /// Payload this capability produces
    type Payload: Send + 'static;

    /// The contract version this capability implements
    fn version(&self) -> &str;

    /// Provider namespace, e.g. `"openai"`
    fn provider(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;

    /// Perform exactly one provider round trip
    async fn invoke(
        &self,
        request: CapabilityRequest<Self::Input>,
    ) -> Result<CapabilityReply<Self::Payload>>;
}
