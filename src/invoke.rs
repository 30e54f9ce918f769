//! Pipeline entry points

use crate::options::InvocationOptions;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tandem_core::{
    Capability, CapabilityRequest, Error, InvocationResult, Message, Result, CAPABILITY_VERSION,
};
use tandem_runtime::{AttributeValue, Executor, LazyAttributes};

/// Invoke a capability once through the full pipeline envelope.
///
/// Checks the capability's contract version, then runs the provider round
/// trip under bounded retries, cooperative cancellation, and nested spans,
/// and assembles the immutable [`InvocationResult`]. The caller's input is
/// returned inside the result untouched.
pub async fn invoke<C>(
    capability: &C,
    input: C::Input,
    options: &InvocationOptions,
) -> Result<InvocationResult<C::Input, C::Payload>>
where
    C: Capability,
    C::Input: Clone + Serialize + Sync,
    C::Payload: Serialize,
{
    run_pipeline("tandem.invoke", capability, input, options).await
}

/// Normalize a conversation and invoke a chat-style capability.
///
/// The conversation is translated into the capability's wire format before
/// the execution envelope starts, so unsupported content surfaces without
/// recording any span or consuming any retry budget.
pub async fn generate<C>(
    capability: &C,
    conversation: &[Message],
    options: &InvocationOptions,
) -> Result<InvocationResult<Vec<Value>, C::Payload>>
where
    C: Capability<Input = Vec<Value>>,
    C::Payload: Serialize,
{
    let wire = tandem_openai::normalize(conversation, capability.provider())?;
    run_pipeline("tandem.generate", capability, wire, options).await
}

async fn run_pipeline<C>(
    operation: &'static str,
    capability: &C,
    input: C::Input,
    options: &InvocationOptions,
) -> Result<InvocationResult<C::Input, C::Payload>>
where
    C: Capability,
    C::Input: Clone + Serialize + Sync,
    C::Payload: Serialize,
{
    // The version gate runs before the tracer and executor exist, so no
    // span ever records a doomed call.
    if capability.version() != CAPABILITY_VERSION {
        return Err(Error::ContractViolation(format!(
            "capability {}/{} implements contract version {:?}, this pipeline supports {:?}",
            capability.provider(),
            capability.model(),
            capability.version(),
            CAPABILITY_VERSION,
        )));
    }

    let tracer = options.tracer();
    let executor = Executor::new(
        options.retry_config().clone(),
        Arc::clone(&tracer),
        options.cancellation().clone(),
    );

    let request = CapabilityRequest {
        input: input.clone(),
        headers: options.headers().clone(),
        provider_options: options.provider_options().clone(),
    };

    let mut attributes = LazyAttributes::new()
        .with_value("provider", capability.provider())
        .with_value("model", capability.model());
    if tracer.enabled() {
        // The serialization thunk needs its own copy of the input; skip
        // even that copy when nobody is listening.
        let input = request.input.clone();
        attributes = attributes.with("input", move || {
            serde_json::to_string(&input).ok().map(AttributeValue::from)
        });
    }

    let reply = executor
        .execute_with(
            operation,
            attributes,
            || capability.invoke(request.clone()),
            |reply| {
                let mut attributes = Vec::new();
                if let Ok(payload) = serde_json::to_string(&reply.payload) {
                    attributes.push(("payload".to_string(), AttributeValue::String(payload)));
                }
                if reply.usage.is_known() {
                    attributes.push((
                        "usage.tokens".to_string(),
                        AttributeValue::Float(reply.usage.tokens()),
                    ));
                }
                attributes
            },
        )
        .await?;

    Ok(InvocationResult::assemble(input, reply))
}
