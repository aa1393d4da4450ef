use bgate_protocol::bedrock::titan::{TitanGenerationConfig, TitanInvocationPayload};
use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;
use bgate_protocol::openai::chat_completions::types::{ChatMessage, ChatMessageRole};

use crate::SamplingParams;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_MAX_TOKEN_COUNT: u32 = 1024;

/// Convert an OpenAI chat request into the Titan text body: a plain
/// `User:`/`Bot:` transcript ending with an open `Bot:` line.
pub fn transform_request(
    request: &CreateChatCompletionRequest,
    params: &SamplingParams,
) -> TitanInvocationPayload {
    TitanInvocationPayload {
        input_text: format_input_text(&request.messages),
        text_generation_config: TitanGenerationConfig {
            max_token_count: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKEN_COUNT),
            temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: params.top_p.unwrap_or(DEFAULT_TOP_P),
            stop_sequences: params.stop_sequences.clone(),
        },
    }
}

fn format_input_text(messages: &[ChatMessage]) -> String {
    let mut transcript = String::new();
    for message in messages {
        if message.content.is_empty() {
            continue;
        }
        let prefix = match message.role {
            ChatMessageRole::System => "System",
            ChatMessageRole::Assistant => "Bot",
            _ => "User",
        };
        transcript.push_str(&format!("{prefix}: {}\n", message.content));
    }
    transcript.push_str("Bot:");
    transcript
}
