use bgate_protocol::bedrock::stability::{StabilityInvocationPayload, StabilityTextPrompt};
use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;
use bgate_protocol::openai::chat_completions::types::ChatMessageRole;

pub const DEFAULT_CFG_SCALE: f64 = 7.0;
pub const DEFAULT_STEPS: u32 = 30;

/// Build a Stability image payload from the user turns of a chat request.
///
/// Nothing on the chat path calls this: the chat endpoint rejects the
/// Stability family outright, since image replies are not expressible as
/// chat completions. The transform exists for an eventual image-generation
/// endpoint, which would reuse the alias registry and invocation client.
pub fn transform_request(request: &CreateChatCompletionRequest) -> StabilityInvocationPayload {
    let text_prompts = request
        .messages
        .iter()
        .filter(|message| {
            message.role == ChatMessageRole::User && !message.content.is_empty()
        })
        .map(|message| StabilityTextPrompt {
            text: message.content.clone(),
            weight: 1.0,
        })
        .collect();

    StabilityInvocationPayload {
        text_prompts,
        cfg_scale: DEFAULT_CFG_SCALE,
        steps: DEFAULT_STEPS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgate_protocol::openai::chat_completions::types::ChatMessage;

    #[test]
    fn only_user_turns_become_prompts() {
        let request = CreateChatCompletionRequest {
            model: "dall-e-3".to_string(),
            messages: vec![
                ChatMessage {
                    role: ChatMessageRole::System,
                    content: "ignore me".to_string(),
                },
                ChatMessage {
                    role: ChatMessageRole::User,
                    content: "a lighthouse at dusk".to_string(),
                },
            ],
            temperature: None,
            max_tokens: None,
            top_p: None,
            stop: None,
            stream: None,
        };

        let payload = transform_request(&request);
        assert_eq!(payload.text_prompts.len(), 1);
        assert_eq!(payload.text_prompts[0].text, "a lighthouse at dusk");
        assert_eq!(payload.text_prompts[0].weight, 1.0);
        assert_eq!(payload.cfg_scale, 7.0);
        assert_eq!(payload.steps, 30);
    }
}
