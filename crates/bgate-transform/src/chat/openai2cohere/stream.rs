use bgate_common::ApiError;
use bgate_protocol::bedrock::cohere::CohereStreamChunk;
use bgate_protocol::openai::chat_completions::stream::{
    ChatCompletionChunkObjectType, ChatStreamChoice, ChatStreamDelta, CreateChatCompletionChunk,
};
use bgate_protocol::openai::chat_completions::types::{ChatResponseRole, CompletionUsage};

use crate::chat::openai2cohere::response::map_finish_reason;
use crate::ResponseMeta;

/// Cohere streams text fragments until a chunk marked `is_finished`.
/// No token counts arrive on either side, so the trailing usage chunk
/// always reports zero.
#[derive(Debug, Default)]
pub struct CohereChatStreamState {
    role_emitted: bool,
}

impl CohereChatStreamState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform_chunk(
        &mut self,
        payload: &[u8],
        meta: &ResponseMeta,
    ) -> Result<Vec<CreateChatCompletionChunk>, ApiError> {
        let native: CohereStreamChunk = serde_json::from_slice(payload).map_err(|err| {
            ApiError::upstream(
                format!("malformed cohere stream chunk: {err}"),
                "MalformedModelResponse",
            )
        })?;

        let mut delta = ChatStreamDelta::default();
        if !self.role_emitted {
            self.role_emitted = true;
            delta.role = Some(ChatResponseRole::Assistant);
        }
        if let Some(text) = native.text {
            if !text.is_empty() {
                delta.content = Some(text);
            }
        }

        let finish_reason = if native.is_finished.unwrap_or(false) {
            Some(map_finish_reason(native.finish_reason.as_deref()))
        } else {
            None
        };

        if delta == ChatStreamDelta::default() && finish_reason.is_none() {
            return Ok(Vec::new());
        }

        Ok(vec![CreateChatCompletionChunk {
            id: meta.id.clone(),
            object: ChatCompletionChunkObjectType::ChatCompletionChunk,
            created: meta.created,
            model: meta.model.clone(),
            choices: vec![ChatStreamChoice {
                index: 0,
                delta,
                finish_reason,
            }],
            usage: None,
        }])
    }

    pub fn usage_chunk(&self, meta: &ResponseMeta) -> CreateChatCompletionChunk {
        CreateChatCompletionChunk {
            id: meta.id.clone(),
            object: ChatCompletionChunkObjectType::ChatCompletionChunk,
            created: meta.created,
            model: meta.model.clone(),
            choices: Vec::new(),
            usage: Some(CompletionUsage::from_counts(0, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgate_protocol::openai::chat_completions::types::ChatFinishReason;

    fn meta() -> ResponseMeta {
        ResponseMeta {
            id: "chatcmpl-test".to_string(),
            created: 1_700_000_000,
            model: "text-embedding-3-large".to_string(),
        }
    }

    #[test]
    fn streams_text_then_finishes() {
        let mut state = CohereChatStreamState::new();
        let meta = meta();

        let first = state
            .transform_chunk(br#"{"text":"Hel"}"#, &meta)
            .expect("first");
        assert_eq!(
            first[0].choices[0].delta.role,
            Some(ChatResponseRole::Assistant)
        );
        assert_eq!(first[0].choices[0].delta.content.as_deref(), Some("Hel"));

        let last = state
            .transform_chunk(
                br#"{"is_finished":true,"finish_reason":"MAX_TOKENS"}"#,
                &meta,
            )
            .expect("last");
        assert_eq!(
            last[0].choices[0].finish_reason,
            Some(ChatFinishReason::Length)
        );
        assert_eq!(state.usage_chunk(&meta).usage, Some(CompletionUsage::from_counts(0, 0)));
    }

    #[test]
    fn garbage_payload_is_an_upstream_error() {
        let mut state = CohereChatStreamState::new();
        let err = state.transform_chunk(b"not json", &meta()).unwrap_err();
        assert!(matches!(err, ApiError::Upstream { .. }));
    }
}
