//! The outward-facing invocation result

use crate::capability::{CapabilityReply, ResponseInfo};
use crate::types::metadata::ProviderMetadata;
use crate::types::usage::Usage;

/// Immutable bundle produced by one successful invocation.
///
/// Built once from the caller's original input and the raw provider reply;
/// owned by the caller thereafter. No setters are exposed.
#[derive(Debug, Clone)]
pub struct InvocationResult<I, P> {
    input: I,
    payload: P,
    usage: Usage,
    provider_metadata: Option<ProviderMetadata>,
    response: Option<ResponseInfo>,
}

impl<I, P> InvocationResult<I, P> {
    /// Assemble the result from the caller's input and a raw reply
    pub fn assemble(input: I, reply: CapabilityReply<P>) -> Self {
        Self {
            input,
            payload: reply.payload,
            usage: reply.usage,
            provider_metadata: reply.provider_metadata,
            response: reply.response,
        }
    }

    /// The original input value the caller supplied
    pub fn input(&self) -> &I {
        &self.input
    }

    /// The payload the capability produced
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Resource usage reported by the provider
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Response-side provider metadata, when reported
    pub fn provider_metadata(&self) -> Option<&ProviderMetadata> {
        self.provider_metadata.as_ref()
    }

    /// Raw response details, when available
    pub fn response(&self) -> Option<&ResponseInfo> {
        self.response.as_ref()
    }

    /// Consume the result, yielding the input and payload
    pub fn into_parts(self) -> (I, P) {
        (self.input, self.payload)
    }
}
