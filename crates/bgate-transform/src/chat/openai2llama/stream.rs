use bgate_common::ApiError;
use bgate_protocol::bedrock::llama::LlamaStreamChunk;
use bgate_protocol::openai::chat_completions::stream::{
    ChatCompletionChunkObjectType, ChatStreamChoice, ChatStreamDelta, CreateChatCompletionChunk,
};
use bgate_protocol::openai::chat_completions::types::{ChatResponseRole, CompletionUsage};

use crate::chat::openai2llama::response::map_stop_reason;
use crate::ResponseMeta;

#[derive(Debug, Default)]
pub struct LlamaChatStreamState {
    prompt_tokens: u32,
    completion_tokens: u32,
    role_emitted: bool,
}

impl LlamaChatStreamState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform_chunk(
        &mut self,
        payload: &[u8],
        meta: &ResponseMeta,
    ) -> Result<Vec<CreateChatCompletionChunk>, ApiError> {
        let native: LlamaStreamChunk = serde_json::from_slice(payload).map_err(|err| {
            ApiError::upstream(
                format!("malformed llama stream chunk: {err}"),
                "MalformedModelResponse",
            )
        })?;

        if let Some(count) = native.prompt_token_count {
            self.prompt_tokens = count;
        }
        if let Some(count) = native.generation_token_count {
            self.completion_tokens = count;
        }

        let mut delta = ChatStreamDelta::default();
        if !self.role_emitted {
            self.role_emitted = true;
            delta.role = Some(ChatResponseRole::Assistant);
        }
        if !native.generation.is_empty() {
            delta.content = Some(native.generation);
        }

        let finish_reason = native
            .stop_reason
            .as_deref()
            .map(|reason| map_stop_reason(Some(reason)));

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
            usage: Some(CompletionUsage::from_counts(
                self.prompt_tokens,
                self.completion_tokens,
            )),
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
            model: "gpt-4-llama".to_string(),
        }
    }

    #[test]
    fn first_chunk_carries_the_role() {
        let mut state = LlamaChatStreamState::new();
        let chunks = state
            .transform_chunk(br#"{"generation":"Hel"}"#, &meta())
            .expect("chunk");
        assert_eq!(
            chunks[0].choices[0].delta.role,
            Some(ChatResponseRole::Assistant)
        );
        assert_eq!(chunks[0].choices[0].delta.content.as_deref(), Some("Hel"));
    }

    #[test]
    fn terminal_chunk_finishes_and_usage_accumulates() {
        let mut state = LlamaChatStreamState::new();
        let meta = meta();
        state
            .transform_chunk(br#"{"generation":"Hello"}"#, &meta)
            .expect("content");
        let last = state
            .transform_chunk(
                br#"{"generation":"","prompt_token_count":12,"generation_token_count":3,"stop_reason":"stop"}"#,
                &meta,
            )
            .expect("terminal");
        assert_eq!(
            last[0].choices[0].finish_reason,
            Some(ChatFinishReason::Stop)
        );
        assert_eq!(
            state.usage_chunk(&meta).usage,
            Some(CompletionUsage::from_counts(12, 3))
        );
    }
}
