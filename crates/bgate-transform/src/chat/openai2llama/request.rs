use bgate_protocol::bedrock::llama::LlamaInvocationPayload;
use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;
use bgate_protocol::openai::chat_completions::types::{ChatMessage, ChatMessageRole};

use crate::SamplingParams;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_MAX_GEN_LEN: u32 = 2048;

/// Convert an OpenAI chat request into the Llama completion-style body:
/// a single flattened prompt with role-tagged sections and a final open
/// assistant turn.
pub fn transform_request(
    request: &CreateChatCompletionRequest,
    params: &SamplingParams,
) -> LlamaInvocationPayload {
    LlamaInvocationPayload {
        prompt: format_prompt(&request.messages),
        temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        top_p: params.top_p.unwrap_or(DEFAULT_TOP_P),
        max_gen_len: params.max_tokens.unwrap_or(DEFAULT_MAX_GEN_LEN),
    }
}

fn format_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();

    if let Some(system) = messages
        .iter()
        .find(|message| message.role == ChatMessageRole::System)
    {
        if !system.content.is_empty() {
            prompt.push_str("<|system|>\n");
            prompt.push_str(&system.content);
            prompt.push('\n');
        }
    }

    for message in messages
        .iter()
        .filter(|message| message.role != ChatMessageRole::System)
    {
        let role = match message.role {
            ChatMessageRole::Assistant => "assistant",
            _ => "user",
        };
        prompt.push_str(&format!("<|{role}|>\n{}\n", message.content));
    }

    prompt.push_str("<|assistant|>\n");
    prompt
}
