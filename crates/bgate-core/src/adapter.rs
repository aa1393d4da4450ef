use bgate_common::ApiError;
use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;
use bgate_protocol::openai::chat_completions::response::CreateChatCompletionResponse;
use bgate_protocol::openai::chat_completions::stream::CreateChatCompletionChunk;
use bgate_transform::chat::openai2claude::stream::ClaudeChatStreamState;
use bgate_transform::chat::openai2cohere::stream::CohereChatStreamState;
use bgate_transform::chat::openai2llama::stream::LlamaChatStreamState;
use bgate_transform::chat::openai2titan::stream::TitanChatStreamState;
use bgate_transform::chat::{openai2claude, openai2cohere, openai2llama, openai2titan};
use bgate_transform::{ResponseMeta, SamplingParams};

use crate::registry::ProviderFamily;

fn no_chat_support(family: ProviderFamily) -> ApiError {
    ApiError::bad_request(format!(
        "chat completions are not supported for provider '{}'",
        family.as_str()
    ))
}

fn payload_bytes<T: serde::Serialize>(payload: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(payload)
        .map_err(|err| ApiError::internal(format!("payload serialization failed: {err}")))
}

/// Serialize the family's native invocation body for a chat request.
pub fn build_payload(
    family: ProviderFamily,
    request: &CreateChatCompletionRequest,
    params: &SamplingParams,
) -> Result<Vec<u8>, ApiError> {
    match family {
        ProviderFamily::Anthropic => {
            payload_bytes(&openai2claude::request::transform_request(request, params))
        }
        ProviderFamily::Meta => {
            payload_bytes(&openai2llama::request::transform_request(request, params))
        }
        ProviderFamily::Cohere => {
            payload_bytes(&openai2cohere::request::transform_request(request, params))
        }
        ProviderFamily::Amazon => {
            payload_bytes(&openai2titan::request::transform_request(request, params))
        }
        // Image replies have no chat shape; the chat path is rejected up
        // front rather than fabricating a completion.
        ProviderFamily::Stability => Err(no_chat_support(family)),
    }
}

/// Translate a complete native reply into the external chat response.
pub fn parse_response(
    family: ProviderFamily,
    body: &[u8],
    meta: &ResponseMeta,
) -> Result<CreateChatCompletionResponse, ApiError> {
    match family {
        ProviderFamily::Anthropic => openai2claude::response::transform_response(body, meta),
        ProviderFamily::Meta => openai2llama::response::transform_response(body, meta),
        ProviderFamily::Cohere => openai2cohere::response::transform_response(body, meta),
        ProviderFamily::Amazon => openai2titan::response::transform_response(body, meta),
        ProviderFamily::Stability => Err(no_chat_support(family)),
    }
}

/// Per-invocation chunk translator, one variant per streaming family.
/// Owns the accumulated usage counters for the terminal summary chunk.
pub enum ChunkTranslator {
    Claude(ClaudeChatStreamState),
    Llama(LlamaChatStreamState),
    Cohere(CohereChatStreamState),
    Titan(TitanChatStreamState),
}

impl ChunkTranslator {
    pub fn new(family: ProviderFamily) -> Result<Self, ApiError> {
        match family {
            ProviderFamily::Anthropic => Ok(Self::Claude(ClaudeChatStreamState::new())),
            ProviderFamily::Meta => Ok(Self::Llama(LlamaChatStreamState::new())),
            ProviderFamily::Cohere => Ok(Self::Cohere(CohereChatStreamState::new())),
            ProviderFamily::Amazon => Ok(Self::Titan(TitanChatStreamState::new())),
            ProviderFamily::Stability => Err(no_chat_support(family)),
        }
    }

    pub fn transform_chunk(
        &mut self,
        payload: &[u8],
        meta: &ResponseMeta,
    ) -> Result<Vec<CreateChatCompletionChunk>, ApiError> {
        match self {
            Self::Claude(state) => state.transform_chunk(payload, meta),
            Self::Llama(state) => state.transform_chunk(payload, meta),
            Self::Cohere(state) => state.transform_chunk(payload, meta),
            Self::Titan(state) => state.transform_chunk(payload, meta),
        }
    }

    pub fn usage_chunk(&self, meta: &ResponseMeta) -> CreateChatCompletionChunk {
        match self {
            Self::Claude(state) => state.usage_chunk(meta),
            Self::Llama(state) => state.usage_chunk(meta),
            Self::Cohere(state) => state.usage_chunk(meta),
            Self::Titan(state) => state.usage_chunk(meta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgate_protocol::openai::chat_completions::types::{ChatMessage, ChatMessageRole};

    fn request(model: &str) -> CreateChatCompletionRequest {
        CreateChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: ChatMessageRole::User,
                content: "Hi".to_string(),
            }],
            temperature: None,
            max_tokens: None,
            top_p: None,
            stop: None,
            stream: None,
        }
    }

    #[test]
    fn builds_family_specific_payloads() {
        let request = request("gpt-4");
        let params = SamplingParams::from_request(&request);

        let claude = build_payload(ProviderFamily::Anthropic, &request, &params).expect("claude");
        let value: serde_json::Value = serde_json::from_slice(&claude).expect("json");
        assert_eq!(value["anthropic_version"], "bedrock-2023-05-31");

        let llama = build_payload(ProviderFamily::Meta, &request, &params).expect("llama");
        let value: serde_json::Value = serde_json::from_slice(&llama).expect("json");
        assert!(value["prompt"].as_str().is_some());
    }

    #[test]
    fn stability_chat_is_rejected_loudly() {
        let request = request("dall-e-3");
        let params = SamplingParams::from_request(&request);

        let err = build_payload(ProviderFamily::Stability, &request, &params).unwrap_err();
        assert!(err.public_message().contains("stability"));
        assert!(ChunkTranslator::new(ProviderFamily::Stability).is_err());
    }
}
