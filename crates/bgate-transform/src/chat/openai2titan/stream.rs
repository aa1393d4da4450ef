use bgate_common::ApiError;
use bgate_protocol::bedrock::titan::TitanStreamChunk;
use bgate_protocol::openai::chat_completions::stream::{
    ChatCompletionChunkObjectType, ChatStreamChoice, ChatStreamDelta, CreateChatCompletionChunk,
};
use bgate_protocol::openai::chat_completions::types::{ChatResponseRole, CompletionUsage};

use crate::chat::openai2titan::response::map_completion_reason;
use crate::ResponseMeta;

#[derive(Debug, Default)]
pub struct TitanChatStreamState {
    prompt_tokens: u32,
    completion_tokens: u32,
    role_emitted: bool,
}

impl TitanChatStreamState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform_chunk(
        &mut self,
        payload: &[u8],
        meta: &ResponseMeta,
    ) -> Result<Vec<CreateChatCompletionChunk>, ApiError> {
        let native: TitanStreamChunk = serde_json::from_slice(payload).map_err(|err| {
            ApiError::upstream(
                format!("malformed titan stream chunk: {err}"),
                "MalformedModelResponse",
            )
        })?;

        if let Some(count) = native.input_text_token_count {
            self.prompt_tokens = count;
        }
        if let Some(count) = native.total_output_text_token_count {
            self.completion_tokens = count;
        }

        let mut delta = ChatStreamDelta::default();
        if !self.role_emitted {
            self.role_emitted = true;
            delta.role = Some(ChatResponseRole::Assistant);
        }
        if let Some(text) = native.output_text {
            if !text.is_empty() {
                delta.content = Some(text);
            }
        }

        let finish_reason = native
            .completion_reason
            .as_deref()
            .map(|reason| map_completion_reason(Some(reason)));

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
