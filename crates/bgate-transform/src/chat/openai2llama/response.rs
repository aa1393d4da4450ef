use bgate_common::ApiError;
use bgate_protocol::bedrock::llama::LlamaResponse;
use bgate_protocol::openai::chat_completions::response::{
    ChatCompletionChoice, ChatCompletionObjectType, ChatResponseMessage,
    CreateChatCompletionResponse,
};
use bgate_protocol::openai::chat_completions::types::{
    ChatFinishReason, ChatResponseRole, CompletionUsage,
};

use crate::ResponseMeta;

pub fn transform_response(
    body: &[u8],
    meta: &ResponseMeta,
) -> Result<CreateChatCompletionResponse, ApiError> {
    let native: LlamaResponse = serde_json::from_slice(body).map_err(|err| {
        ApiError::upstream(
            format!("malformed llama response: {err}"),
            "MalformedModelResponse",
        )
    })?;

    Ok(CreateChatCompletionResponse {
        id: meta.id.clone(),
        object: ChatCompletionObjectType::ChatCompletion,
        created: meta.created,
        model: meta.model.clone(),
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ChatResponseMessage {
                role: ChatResponseRole::Assistant,
                content: native.generation,
            },
            finish_reason: map_stop_reason(native.stop_reason.as_deref()),
        }],
        usage: CompletionUsage::from_counts(
            native.prompt_token_count.unwrap_or(0),
            native.generation_token_count.unwrap_or(0),
        ),
    })
}

pub fn map_stop_reason(stop_reason: Option<&str>) -> ChatFinishReason {
    match stop_reason {
        Some("length") => ChatFinishReason::Length,
        _ => ChatFinishReason::Stop,
    }
}
