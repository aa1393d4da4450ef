use bgate_common::ApiError;
use bgate_protocol::bedrock::claude::{ClaudeStreamEvent, ClaudeStreamEventKnown};
use bgate_protocol::openai::chat_completions::stream::{
    ChatCompletionChunkObjectType, ChatStreamChoice, ChatStreamDelta, CreateChatCompletionChunk,
};
use bgate_protocol::openai::chat_completions::types::{
    ChatFinishReason, ChatResponseRole, CompletionUsage,
};

use crate::chat::openai2claude::response::map_stop_reason;
use crate::ResponseMeta;

/// Incremental translator for a Bedrock Claude response stream.
///
/// Chunks are translated strictly in arrival order; usage is accumulated
/// for the terminal summary chunk.
#[derive(Debug, Default)]
pub struct ClaudeChatStreamState {
    input_tokens: u32,
    output_tokens: u32,
    role_emitted: bool,
    finish_emitted: bool,
}

impl ClaudeChatStreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one decoded native chunk. A chunk may yield zero or more
    /// external chunks (pings and unknown events yield none).
    pub fn transform_chunk(
        &mut self,
        payload: &[u8],
        meta: &ResponseMeta,
    ) -> Result<Vec<CreateChatCompletionChunk>, ApiError> {
        let event: ClaudeStreamEvent = serde_json::from_slice(payload).map_err(|err| {
            ApiError::upstream(
                format!("malformed claude stream chunk: {err}"),
                "MalformedModelResponse",
            )
        })?;

        let event = match event {
            ClaudeStreamEvent::Known(event) => event,
            ClaudeStreamEvent::Unknown(_) => return Ok(Vec::new()),
        };

        let chunks = match event {
            ClaudeStreamEventKnown::MessageStart { message } => {
                if let Some(usage) = message.usage {
                    self.input_tokens = usage.input_tokens;
                }
                self.role_emitted = true;
                vec![chunk(
                    meta,
                    ChatStreamDelta {
                        role: Some(ChatResponseRole::Assistant),
                        content: None,
                    },
                    None,
                )]
            }
            ClaudeStreamEventKnown::ContentBlockDelta { delta, .. } => match delta.text {
                Some(text) if !text.is_empty() => {
                    vec![self.content_chunk(meta, text)]
                }
                _ => Vec::new(),
            },
            ClaudeStreamEventKnown::MessageDelta { delta, usage } => {
                if let Some(usage) = usage {
                    self.output_tokens = usage.output_tokens;
                }
                let finish_reason = map_stop_reason(delta.stop_reason.as_deref());
                self.finish_emitted = true;
                vec![chunk(meta, ChatStreamDelta::default(), Some(finish_reason))]
            }
            ClaudeStreamEventKnown::MessageStop => {
                if self.finish_emitted {
                    Vec::new()
                } else {
                    self.finish_emitted = true;
                    vec![chunk(
                        meta,
                        ChatStreamDelta::default(),
                        Some(ChatFinishReason::Stop),
                    )]
                }
            }
            ClaudeStreamEventKnown::ContentBlockStart { .. }
            | ClaudeStreamEventKnown::ContentBlockStop { .. }
            | ClaudeStreamEventKnown::Ping => Vec::new(),
        };

        Ok(chunks)
    }

    /// Terminal summary chunk with the cumulative usage counts.
    pub fn usage_chunk(&self, meta: &ResponseMeta) -> CreateChatCompletionChunk {
        CreateChatCompletionChunk {
            id: meta.id.clone(),
            object: ChatCompletionChunkObjectType::ChatCompletionChunk,
            created: meta.created,
            model: meta.model.clone(),
            choices: Vec::new(),
            usage: Some(CompletionUsage::from_counts(
                self.input_tokens,
                self.output_tokens,
            )),
        }
    }

    fn content_chunk(&mut self, meta: &ResponseMeta, text: String) -> CreateChatCompletionChunk {
        let role = if self.role_emitted {
            None
        } else {
            self.role_emitted = true;
            Some(ChatResponseRole::Assistant)
        };
        chunk(
            meta,
            ChatStreamDelta {
                role,
                content: Some(text),
            },
            None,
        )
    }
}

fn chunk(
    meta: &ResponseMeta,
    delta: ChatStreamDelta,
    finish_reason: Option<ChatFinishReason>,
) -> CreateChatCompletionChunk {
    CreateChatCompletionChunk {
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
    }
}
