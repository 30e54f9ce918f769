//! Core types and contracts for the Tandem pipeline
//!
//! This crate provides the unified conversation model, the capability
//! contract, and the result/error types shared by the rest of the
//! workspace. It performs no I/O.

pub mod capability;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use capability::{
    Capability, CapabilityReply, CapabilityRequest, ResponseInfo, CAPABILITY_VERSION,
};
pub use error::{Error, Result};
pub use types::{
    message::{
        AssistantMessage, AssistantPart, FilePart, ImagePart, ImageSource, Message, Role,
        SystemMessage, TextPart, ToolCallPart, ToolMessage, ToolResultPart, UserMessage, UserPart,
    },
    metadata::{ProviderMetadata, ProviderOptions},
    result::InvocationResult,
    usage::Usage,
};
