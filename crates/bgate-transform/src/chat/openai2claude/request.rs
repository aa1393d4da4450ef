use bgate_protocol::bedrock::claude::{
    ClaudeInvocationPayload, ClaudeMessage, ClaudeRole, ANTHROPIC_VERSION,
};
use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;
use bgate_protocol::openai::chat_completions::types::ChatMessageRole;

use crate::SamplingParams;

pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.95;

/// Convert an OpenAI chat request into the Claude invocation body.
///
/// The first system message (if any) is lifted into the separate `system`
/// field; later system messages are dropped. Every remaining non-assistant
/// role normalizes to `user`.
pub fn transform_request(
    request: &CreateChatCompletionRequest,
    params: &SamplingParams,
) -> ClaudeInvocationPayload {
    let system = request
        .messages
        .iter()
        .find(|message| message.role == ChatMessageRole::System)
        .map(|message| message.content.clone())
        .filter(|content| !content.is_empty());

    let messages = request
        .messages
        .iter()
        .filter(|message| message.role != ChatMessageRole::System)
        .map(|message| ClaudeMessage {
            role: map_role(message.role),
            content: message.content.clone(),
        })
        .collect();

    ClaudeInvocationPayload {
        anthropic_version: ANTHROPIC_VERSION.to_string(),
        max_tokens_to_sample: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        top_p: params.top_p.unwrap_or(DEFAULT_TOP_P),
        stop_sequences: params.stop_sequences.clone(),
        system,
        messages,
    }
}

fn map_role(role: ChatMessageRole) -> ClaudeRole {
    match role {
        ChatMessageRole::Assistant => ClaudeRole::Assistant,
        _ => ClaudeRole::User,
    }
}
