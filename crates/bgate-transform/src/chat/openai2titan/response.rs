use bgate_common::ApiError;
use bgate_protocol::bedrock::titan::TitanResponse;
use bgate_protocol::openai::chat_completions::response::{
    ChatCompletionChoice, ChatCompletionObjectType, ChatResponseMessage,
    CreateChatCompletionResponse,
};
use bgate_protocol::openai::chat_completions::types::{
    ChatFinishReason, ChatResponseRole, CompletionUsage,
};

use crate::ResponseMeta;

/// Convert a non-streamed Titan reply into the OpenAI chat response.
pub fn transform_response(
    body: &[u8],
    meta: &ResponseMeta,
) -> Result<CreateChatCompletionResponse, ApiError> {
    let native: TitanResponse = serde_json::from_slice(body).map_err(|err| {
        ApiError::upstream(
            format!("malformed titan response: {err}"),
            "MalformedModelResponse",
        )
    })?;

    let result = native.results.into_iter().next().ok_or_else(|| {
        ApiError::upstream(
            "malformed titan response: no results",
            "MalformedModelResponse",
        )
    })?;

    let finish_reason = map_completion_reason(result.completion_reason.as_deref());
    let prompt_tokens = native.input_text_token_count.unwrap_or(0);
    let completion_tokens = result.token_count.unwrap_or(0);

    Ok(CreateChatCompletionResponse {
        id: meta.id.clone(),
        object: ChatCompletionObjectType::ChatCompletion,
        created: meta.created,
        model: meta.model.clone(),
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ChatResponseMessage {
                role: ChatResponseRole::Assistant,
                content: result.output_text,
            },
            finish_reason,
        }],
        usage: CompletionUsage::from_counts(prompt_tokens, completion_tokens),
    })
}

pub fn map_completion_reason(completion_reason: Option<&str>) -> ChatFinishReason {
    match completion_reason {
        Some("LENGTH") => ChatFinishReason::Length,
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
            model: "text-embedding-ada-002".to_string(),
        }
    }

    #[test]
    fn maps_completion_reasons() {
        assert_eq!(
            map_completion_reason(Some("FINISH")),
            ChatFinishReason::Stop
        );
        assert_eq!(
            map_completion_reason(Some("LENGTH")),
            ChatFinishReason::Length
        );
        assert_eq!(map_completion_reason(None), ChatFinishReason::Stop);
    }

    #[test]
    fn takes_the_first_result_and_counts() {
        let body = br#"{"inputTextTokenCount":7,"results":[{"outputText":" Hello","tokenCount":2,"completionReason":"FINISH"}]}"#;
        let response = transform_response(body, &meta()).expect("transform");

        assert_eq!(response.choices[0].message.content, " Hello");
        assert_eq!(response.choices[0].finish_reason, ChatFinishReason::Stop);
        assert_eq!(response.usage.prompt_tokens, 7);
        assert_eq!(response.usage.completion_tokens, 2);
        assert_eq!(response.usage.total_tokens, 9);
    }

    #[test]
    fn empty_results_is_a_malformed_reply() {
        let err = transform_response(br#"{"results":[]}"#, &meta()).unwrap_err();
        assert!(matches!(err, ApiError::Upstream { .. }));
    }
}
