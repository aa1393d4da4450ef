use serde::{Deserialize, Serialize};

/// Native invocation body for Meta Llama models behind Bedrock: one
/// flattened prompt string, no structured message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlamaInvocationPayload {
    pub prompt: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_gen_len: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlamaResponse {
    #[serde(default)]
    pub generation: String,
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub generation_token_count: Option<u32>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Streamed chunks reuse the response field set; intermediate chunks carry
/// `generation` fragments, the last one carries `stop_reason` and counts.
pub type LlamaStreamChunk = LlamaResponse;
