use bgate_common::ApiError;
use bgate_protocol::bedrock::claude::ClaudeResponse;
use bgate_protocol::openai::chat_completions::response::{
    ChatCompletionChoice, ChatCompletionObjectType, ChatResponseMessage,
    CreateChatCompletionResponse,
};
use bgate_protocol::openai::chat_completions::types::{
    ChatFinishReason, ChatResponseRole, CompletionUsage,
};

use crate::ResponseMeta;

/// Convert a non-streamed Claude reply into the OpenAI chat response.
pub fn transform_response(
    body: &[u8],
    meta: &ResponseMeta,
) -> Result<CreateChatCompletionResponse, ApiError> {
    let native: ClaudeResponse = serde_json::from_slice(body).map_err(|err| {
        ApiError::upstream(
            format!("malformed claude response: {err}"),
            "MalformedModelResponse",
        )
    })?;

    let content = native
        .content
        .first()
        .map(|block| block.text.clone())
        .ok_or_else(|| {
            ApiError::upstream(
                "malformed claude response: empty content",
                "MalformedModelResponse",
            )
        })?;

    let usage = native.usage.unwrap_or_default();
    let finish_reason = map_stop_reason(native.stop_reason.as_deref());

    Ok(CreateChatCompletionResponse {
        id: meta.id.clone(),
        object: ChatCompletionObjectType::ChatCompletion,
        created: meta.created,
        model: meta.model.clone(),
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ChatResponseMessage {
                role: ChatResponseRole::Assistant,
                content,
            },
            finish_reason,
        }],
        usage: CompletionUsage::from_counts(usage.input_tokens, usage.output_tokens),
    })
}

/// An unrecognized stop reason is not an error; it reads as a normal stop.
pub fn map_stop_reason(stop_reason: Option<&str>) -> ChatFinishReason {
    match stop_reason {
        Some("stop_sequence") => ChatFinishReason::Stop,
        Some("max_tokens") => ChatFinishReason::Stop,
        Some("max_tokens_reached") => ChatFinishReason::Length,
        _ => ChatFinishReason::Stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ResponseMeta {
        ResponseMeta {
            id: "chatcmpl-test".to_string(),
            created: 1_700_000_000,
            model: "gpt-4".to_string(),
        }
    }

    #[test]
    fn maps_stop_reasons_per_table() {
        assert_eq!(map_stop_reason(Some("stop_sequence")), ChatFinishReason::Stop);
        assert_eq!(map_stop_reason(Some("max_tokens")), ChatFinishReason::Stop);
        assert_eq!(
            map_stop_reason(Some("max_tokens_reached")),
            ChatFinishReason::Length
        );
        assert_eq!(map_stop_reason(Some("anything_else")), ChatFinishReason::Stop);
        assert_eq!(map_stop_reason(None), ChatFinishReason::Stop);
    }

    #[test]
    fn transforms_reference_reply() {
        let body = br#"{"content":[{"text":"Hello"}],"stop_reason":"stop_sequence","usage":{"input_tokens":5,"output_tokens":1}}"#;
        let response = transform_response(body, &meta()).expect("transform");

        assert_eq!(response.choices[0].message.content, "Hello");
        assert_eq!(response.choices[0].finish_reason, ChatFinishReason::Stop);
        assert_eq!(response.usage.prompt_tokens, 5);
        assert_eq!(response.usage.completion_tokens, 1);
        assert_eq!(response.usage.total_tokens, 6);
        // Echoes the external model name, not the Bedrock id.
        assert_eq!(response.model, "gpt-4");
        assert_eq!(response.id, "chatcmpl-test");
    }

    #[test]
    fn missing_usage_defaults_to_zero() {
        let body = br#"{"content":[{"text":"Hi"}]}"#;
        let response = transform_response(body, &meta()).expect("transform");
        assert_eq!(response.usage.prompt_tokens, 0);
        assert_eq!(response.usage.total_tokens, 0);
    }

    #[test]
    fn empty_content_is_a_malformed_reply() {
        let err = transform_response(br#"{"content":[]}"#, &meta()).unwrap_err();
        assert!(matches!(err, ApiError::Upstream { .. }));
    }
}
