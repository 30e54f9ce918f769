//! Conversation normalization into the OpenAI-compatible chat schema

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Map, Value};
use tandem_core::{
    AssistantMessage, AssistantPart, Error, ImageSource, Message, ProviderMetadata, Result,
    SystemMessage, ToolMessage, UserMessage, UserPart,
};

/// Normalize a unified conversation into OpenAI-compatible wire messages.
///
/// Pure translation: no I/O, and the caller's conversation is never
/// mutated — every wire message is built fresh. Provider-metadata overlays
/// whose namespace matches `target` are shallow-merged into the wire
/// objects they belong to, with more specific scopes winning on key
/// collision (part over message, overlay over structural field). Overlays
/// for other namespaces are ignored and left intact on the input.
///
/// Fails only on content the wire format cannot express.
pub fn normalize(messages: &[Message], target: &str) -> Result<Vec<Value>> {
    let mut wire = Vec::new();

    for message in messages {
        match message {
            Message::System(msg) => wire.push(system_message(msg, target)),
            Message::User(msg) => wire.push(user_message(msg, target)?),
            Message::Assistant(msg) => wire.push(assistant_message(msg, target)?),
            Message::Tool(msg) => tool_messages(msg, target, &mut wire)?,
        }
    }

    Ok(wire)
}

/// Shallow-merge the `target` bag of an overlay into a wire object.
/// Overlay keys overwrite whatever is already there.
fn apply_overlay(object: &mut Map<String, Value>, overlay: Option<&ProviderMetadata>, target: &str) {
    if let Some(bag) = overlay.and_then(|meta| meta.get(target)) {
        for (key, value) in bag {
            object.insert(key.clone(), value.clone());
        }
    }
}

fn system_message(msg: &SystemMessage, target: &str) -> Value {
    let mut object = Map::new();
    object.insert("role".into(), json!("system"));
    object.insert("content".into(), json!(msg.content));
    apply_overlay(&mut object, msg.metadata.as_ref(), target);
    Value::Object(object)
}

fn user_message(msg: &UserMessage, target: &str) -> Result<Value> {
    // A lone text part collapses to a plain string, the common fast path.
    if let [UserPart::Text(part)] = msg.content.as_slice() {
        let mut object = Map::new();
        object.insert("role".into(), json!("user"));
        object.insert("content".into(), json!(part.text));
        apply_overlay(&mut object, msg.metadata.as_ref(), target);
        apply_overlay(&mut object, part.metadata.as_ref(), target);
        return Ok(Value::Object(object));
    }

    let mut parts = Vec::with_capacity(msg.content.len());
    for part in &msg.content {
        parts.push(user_part(part, target)?);
    }

    let mut object = Map::new();
    object.insert("role".into(), json!("user"));
    object.insert("content".into(), Value::Array(parts));
    apply_overlay(&mut object, msg.metadata.as_ref(), target);
    Ok(Value::Object(object))
}

fn user_part(part: &UserPart, target: &str) -> Result<Value> {
    match part {
        UserPart::Text(text) => {
            let mut object = Map::new();
            object.insert("type".into(), json!("text"));
            object.insert("text".into(), json!(text.text));
            apply_overlay(&mut object, text.metadata.as_ref(), target);
            Ok(Value::Object(object))
        }
        UserPart::Image(image) => {
            let url = match &image.source {
                ImageSource::Url(url) => url.clone(),
                ImageSource::Bytes { data, mime_type } => format!(
                    "data:{};base64,{}",
                    mime_type.as_deref().unwrap_or("image/jpeg"),
                    BASE64.encode(data)
                ),
            };
            let mut object = Map::new();
            object.insert("type".into(), json!("image_url"));
            object.insert("image_url".into(), json!({ "url": url }));
            apply_overlay(&mut object, image.metadata.as_ref(), target);
            Ok(Value::Object(object))
        }
        UserPart::File(_) => Err(Error::UnsupportedContent(
            "file parts have no representation in the chat completion format".into(),
        )),
    }
}

fn assistant_message(msg: &AssistantMessage, target: &str) -> Result<Value> {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for part in &msg.content {
        match part {
            // Text parts are concatenated in order. Their overlays are
            // discarded: the flat `content` string has no field to merge
            // them into.
            AssistantPart::Text(part) => text.push_str(&part.text),
            AssistantPart::ToolCall(call) => {
                let mut object = Map::new();
                object.insert("id".into(), json!(call.call_id));
                object.insert("type".into(), json!("function"));
                object.insert(
                    "function".into(),
                    json!({
                        "name": call.tool_name,
                        "arguments": serde_json::to_string(&call.arguments)?,
                    }),
                );
                apply_overlay(&mut object, call.metadata.as_ref(), target);
                tool_calls.push(Value::Object(object));
            }
        }
    }

    let mut object = Map::new();
    object.insert("role".into(), json!("assistant"));
    object.insert("content".into(), json!(text));
    if !tool_calls.is_empty() {
        object.insert("tool_calls".into(), Value::Array(tool_calls));
    }
    apply_overlay(&mut object, msg.metadata.as_ref(), target);
    Ok(Value::Object(object))
}

/// Tool messages fan out: one independent wire message per result part.
fn tool_messages(msg: &ToolMessage, target: &str, wire: &mut Vec<Value>) -> Result<()> {
    for part in &msg.content {
        let mut object = Map::new();
        object.insert("role".into(), json!("tool"));
        object.insert("tool_call_id".into(), json!(part.call_id));
        object.insert("content".into(), json!(serde_json::to_string(&part.result)?));
        apply_overlay(&mut object, msg.metadata.as_ref(), target);
        apply_overlay(&mut object, part.metadata.as_ref(), target);
        wire.push(Value::Object(object));
    }
    Ok(())
}
