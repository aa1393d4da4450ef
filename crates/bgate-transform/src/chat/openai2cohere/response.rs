use bgate_common::ApiError;
use bgate_protocol::bedrock::cohere::CohereResponse;
use bgate_protocol::openai::chat_completions::response::{
    ChatCompletionChoice, ChatCompletionObjectType, ChatResponseMessage,
    CreateChatCompletionResponse,
};
use bgate_protocol::openai::chat_completions::types::{
    ChatFinishReason, ChatResponseRole, CompletionUsage,
};

use crate::ResponseMeta;

/// Convert a non-streamed Cohere Command reply into the OpenAI chat
/// response. Cohere reports no token counts, so usage is always zero.
pub fn transform_response(
    body: &[u8],
    meta: &ResponseMeta,
) -> Result<CreateChatCompletionResponse, ApiError> {
    let native: CohereResponse = serde_json::from_slice(body).map_err(|err| {
        ApiError::upstream(
            format!("malformed cohere response: {err}"),
            "MalformedModelResponse",
        )
    })?;

    let generation = native.generations.into_iter().next().ok_or_else(|| {
        ApiError::upstream(
            "malformed cohere response: no generations",
            "MalformedModelResponse",
        )
    })?;

    let finish_reason = map_finish_reason(generation.finish_reason.as_deref());

    Ok(CreateChatCompletionResponse {
        id: meta.id.clone(),
        object: ChatCompletionObjectType::ChatCompletion,
        created: meta.created,
        model: meta.model.clone(),
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ChatResponseMessage {
                role: ChatResponseRole::Assistant,
                content: generation.text,
            },
            finish_reason,
        }],
        usage: CompletionUsage::from_counts(0, 0),
    })
}

pub fn map_finish_reason(finish_reason: Option<&str>) -> ChatFinishReason {
    match finish_reason {
        Some("MAX_TOKENS") => ChatFinishReason::Length,
        _ => ChatFinishReason::Stop,
    }
}
