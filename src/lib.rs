//! Tandem — a provider-agnostic invocation pipeline for LLM capabilities
//!
//! Tandem translates a unified, multi-modal conversation into a provider's
//! wire format and invokes the provider's model through a uniform,
//! versioned contract, wrapping every outbound call in a bounded-retry,
//! cancellable, observable execution envelope.
//!
//! # Features
//!
//! - **Unified conversations**: one message model across system, user,
//!   assistant, and tool roles, with per-provider metadata overlays
//! - **Lossless normalization**: content ordering and caller data survive
//!   translation to the OpenAI-compatible chat schema
//! - **Execution envelope**: bounded retries, cooperative cancellation,
//!   and nested spans with lazily computed attributes
//! - **Provider-agnostic**: capabilities are plain trait objects; no
//!   transport or credentials live in this workspace
//!
//! # Quick Start
//!
//! ```no_run
//! use async_trait::async_trait;
//! use tandem::{
//!     generate, Capability, CapabilityReply, CapabilityRequest, InvocationOptions, Message,
//!     Result, Usage, CAPABILITY_VERSION,
//! };
//!
//! struct ChatModel;
//!
//! #[async_trait]
//! impl Capability for ChatModel {
//!     type Input = Vec<serde_json::Value>;
//!     type Payload = String;
//!
//!     fn version(&self) -> &str {
//!         CAPABILITY_VERSION
//!     }
//!
//!     fn provider(&self) -> &str {
//!         "openai"
//!     }
//!
//!     fn model(&self) -> &str {
//!         "gpt-4o-mini"
//!     }
//!
//!     async fn invoke(
//!         &self,
//!         _request: CapabilityRequest<Self::Input>,
//!     ) -> Result<CapabilityReply<Self::Payload>> {
//!         // One provider round trip happens here.
//!         Ok(CapabilityReply::new("hi!".to_string()).with_usage(Usage::known(3)))
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let conversation = vec![Message::system("Be brief."), Message::user("Say hi")];
//! let result = generate(&ChatModel, &conversation, &InvocationOptions::default()).await?;
//! println!("{}", result.payload());
//! # Ok(())
//! # }
//! ```

// Re-export core types
pub use tandem_core::*;

/// OpenAI-compatible wire normalization
pub mod openai {
    pub use tandem_openai::*;
}

/// Retry execution and the telemetry seam
pub mod runtime {
    pub use tandem_runtime::*;
}

mod invoke;
mod options;

pub use invoke::{generate, invoke};
pub use options::InvocationOptions;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{generate, invoke, InvocationOptions};
    pub use tandem_core::{
        Capability, CapabilityReply, CapabilityRequest, Error, InvocationResult, Message,
        ProviderMetadata, Result, Usage, CAPABILITY_VERSION,
    };
    pub use tandem_runtime::{RetryConfig, Tracer};
}
