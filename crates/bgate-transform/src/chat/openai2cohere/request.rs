use bgate_protocol::bedrock::cohere::CohereInvocationPayload;
use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;
use bgate_protocol::openai::chat_completions::types::{ChatMessage, ChatMessageRole};

use crate::SamplingParams;

pub const DEFAULT_TEMPERATURE: f64 = 0.75;
pub const DEFAULT_P: f64 = 0.75;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Convert an OpenAI chat request into the Cohere Command completion body:
/// one prompt string with role-prefixed lines and a trailing `Chatbot:`
/// cue for the model to continue.
pub fn transform_request(
    request: &CreateChatCompletionRequest,
    params: &SamplingParams,
) -> CohereInvocationPayload {
    CohereInvocationPayload {
        prompt: format_prompt(&request.messages),
        temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        p: params.top_p.unwrap_or(DEFAULT_P),
        max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        stop_sequences: params.stop_sequences.clone(),
    }
}

fn format_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    for message in messages {
        if message.content.is_empty() {
            continue;
        }
        let prefix = match message.role {
            ChatMessageRole::System => "System",
            ChatMessageRole::Assistant => "Chatbot",
            _ => "User",
        };
        prompt.push_str(&format!("{prefix}: {}\n", message.content));
    }
    prompt.push_str("Chatbot:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: ChatMessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn flattens_roles_into_prefixed_lines() {
        let request = CreateChatCompletionRequest {
            model: "text-embedding-3-large".to_string(),
            messages: vec![
                message(ChatMessageRole::System, "Be brief"),
                message(ChatMessageRole::User, "Hi"),
                message(ChatMessageRole::Assistant, "Hello"),
                message(ChatMessageRole::User, "Bye"),
            ],
            temperature: None,
            max_tokens: None,
            top_p: None,
            stop: None,
            stream: None,
        };

        let payload = transform_request(&request, &SamplingParams::from_request(&request));
        assert_eq!(
            payload.prompt,
            "System: Be brief\nUser: Hi\nChatbot: Hello\nUser: Bye\nChatbot:"
        );
        assert_eq!(payload.temperature, 0.75);
        assert_eq!(payload.p, 0.75);
        assert_eq!(payload.max_tokens, 1024);
        assert!(payload.stop_sequences.is_empty());
    }

    #[test]
    fn overrides_and_stops_pass_through() {
        let request = CreateChatCompletionRequest {
            model: "text-embedding-3-large".to_string(),
            messages: vec![message(ChatMessageRole::User, "Hi")],
            temperature: Some(0.1),
            max_tokens: Some(32),
            top_p: Some(0.5),
            stop: Some(
                bgate_protocol::openai::chat_completions::request::StopConfiguration::Single(
                    "END".to_string(),
                ),
            ),
            stream: None,
        };

        let payload = transform_request(&request, &SamplingParams::from_request(&request));
        assert_eq!(payload.temperature, 0.1);
        assert_eq!(payload.p, 0.5);
        assert_eq!(payload.max_tokens, 32);
        assert_eq!(payload.stop_sequences, vec!["END".to_string()]);
    }
}
