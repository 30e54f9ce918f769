//! Message types for unified conversations

use crate::types::metadata::ProviderMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Tool message (tool-call results)
    Tool,
}

/// A message in a unified conversation.
///
/// Each role carries its own content shape. The enum is deliberately
/// exhaustive — adding a role is a compile error at every dispatch site,
/// never a silent no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Instructions for the model
    System(SystemMessage),
    /// Caller-supplied content
    User(UserMessage),
    /// Model-produced content
    Assistant(AssistantMessage),
    /// Results of tool calls the model requested
    Tool(ToolMessage),
}

/// Body of a system message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    /// The instruction text
    pub content: String,
    /// Message-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

/// Body of a user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    /// Ordered content parts
    pub content: Vec<UserPart>,
    /// Message-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

/// Body of an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Ordered content parts
    pub content: Vec<AssistantPart>,
    /// Message-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

/// Body of a tool message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMessage {
    /// One result per tool call being answered
    pub content: Vec<ToolResultPart>,
    /// Message-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

/// Content parts a user message may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UserPart {
    /// Plain text
    Text(TextPart),
    /// An image, by reference or by raw bytes
    Image(ImagePart),
    /// An opaque file attachment
    File(FilePart),
}

/// Content parts an assistant message may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssistantPart {
    /// Plain text
    Text(TextPart),
    /// A tool invocation requested by the model
    ToolCall(ToolCallPart),
}

/// Plain text content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    /// The text
    pub text: String,
    /// Part-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

/// Image content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePart {
    /// Where the image bytes come from
    pub source: ImageSource,
    /// Part-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

/// Where an image's bytes come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    /// A URL the provider fetches itself
    Url(String),
    /// Raw bytes supplied by the caller
    Bytes {
        /// The image data
        data: Vec<u8>,
        /// MIME type (e.g. "image/png"); defaults to "image/jpeg" on the wire
        mime_type: Option<String>,
    },
}

/// File content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePart {
    /// The file data
    pub data: Vec<u8>,
    /// MIME type (e.g. "application/pdf")
    pub mime_type: Option<String>,
    /// Part-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPart {
    /// Unique ID for this call
    pub call_id: String,
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments as structured JSON
    pub arguments: Value,
    /// Part-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

/// The result of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultPart {
    /// ID of the tool call this answers
    pub call_id: String,
    /// Arbitrary result value
    pub result: Value,
    /// Part-level provider overlay
    pub metadata: Option<ProviderMetadata>,
}

impl Message {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Message::System(SystemMessage {
            content: text.into(),
            metadata: None,
        })
    }

    /// Create a user message with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        Message::User(UserMessage {
            content: vec![UserPart::Text(TextPart::new(text))],
            metadata: None,
        })
    }

    /// Create a user message from parts
    pub fn user_parts(parts: impl IntoIterator<Item = UserPart>) -> Self {
        Message::User(UserMessage {
            content: parts.into_iter().collect(),
            metadata: None,
        })
    }

    /// Create an assistant message with a single text part
    pub fn assistant(text: impl Into<String>) -> Self {
        Message::Assistant(AssistantMessage {
            content: vec![AssistantPart::Text(TextPart::new(text))],
            metadata: None,
        })
    }

    /// Create an assistant message from parts
    pub fn assistant_parts(parts: impl IntoIterator<Item = AssistantPart>) -> Self {
        Message::Assistant(AssistantMessage {
            content: parts.into_iter().collect(),
            metadata: None,
        })
    }

    /// Create a tool message answering a single tool call
    pub fn tool_result(call_id: impl Into<String>, result: Value) -> Self {
        Message::Tool(ToolMessage {
            content: vec![ToolResultPart {
                call_id: call_id.into(),
                result,
                metadata: None,
            }],
            metadata: None,
        })
    }

    /// Create a tool message from result parts
    pub fn tool_results(parts: impl IntoIterator<Item = ToolResultPart>) -> Self {
        Message::Tool(ToolMessage {
            content: parts.into_iter().collect(),
            metadata: None,
        })
    }

    /// The role of this message
    pub fn role(&self) -> Role {
        match self {
            Message::System(_) => Role::System,
            Message::User(_) => Role::User,
            Message::Assistant(_) => Role::Assistant,
            Message::Tool(_) => Role::Tool,
        }
    }

    /// The message-level provider overlay, if any
    pub fn metadata(&self) -> Option<&ProviderMetadata> {
        match self {
            Message::System(msg) => msg.metadata.as_ref(),
            Message::User(msg) => msg.metadata.as_ref(),
            Message::Assistant(msg) => msg.metadata.as_ref(),
            Message::Tool(msg) => msg.metadata.as_ref(),
        }
    }

    /// Attach a message-level provider overlay, builder style
    pub fn with_metadata(mut self, metadata: ProviderMetadata) -> Self {
        let slot = match &mut self {
            Message::System(msg) => &mut msg.metadata,
            Message::User(msg) => &mut msg.metadata,
            Message::Assistant(msg) => &mut msg.metadata,
            Message::Tool(msg) => &mut msg.metadata,
        };
        *slot = Some(metadata);
        self
    }
}

impl TextPart {
    /// Create a text part
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
        }
    }

    /// Attach a part-level provider overlay, builder style
    pub fn with_metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl ImagePart {
    /// Create an image part from a URL
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            source: ImageSource::Url(url.into()),
            metadata: None,
        }
    }

    /// Create an image part from raw bytes
    pub fn bytes(data: impl Into<Vec<u8>>, mime_type: Option<String>) -> Self {
        Self {
            source: ImageSource::Bytes {
                data: data.into(),
                mime_type,
            },
            metadata: None,
        }
    }

    /// Attach a part-level provider overlay, builder style
    pub fn with_metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl ToolCallPart {
    /// Create a tool-call part
    pub fn new(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Value,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments,
            metadata: None,
        }
    }

    /// Attach a part-level provider overlay, builder style
    pub fn with_metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl ToolResultPart {
    /// Create a tool-result part
    pub fn new(call_id: impl Into<String>, result: Value) -> Self {
        Self {
            call_id: call_id.into(),
            result,
            metadata: None,
        }
    }

    /// Attach a part-level provider overlay, builder style
    pub fn with_metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// Conversion implementations
impl From<TextPart> for UserPart {
    fn from(part: TextPart) -> Self {
        UserPart::Text(part)
    }
}

impl From<ImagePart> for UserPart {
    fn from(part: ImagePart) -> Self {
        UserPart::Image(part)
    }
}

impl From<FilePart> for UserPart {
    fn from(part: FilePart) -> Self {
        UserPart::File(part)
    }
}

impl From<TextPart> for AssistantPart {
    fn from(part: TextPart) -> Self {
        AssistantPart::Text(part)
    }
}

impl From<ToolCallPart> for AssistantPart {
    fn from(part: ToolCallPart) -> Self {
        AssistantPart::ToolCall(part)
    }
}
