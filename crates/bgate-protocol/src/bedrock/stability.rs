use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityTextPrompt {
    pub text: String,
    pub weight: f64,
}

/// Native invocation body for Stability image models behind Bedrock.
/// Only the request side is modeled; image responses have no chat-shaped
/// translation (see the stability adapter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityInvocationPayload {
    pub text_prompts: Vec<StabilityTextPrompt>,
    pub cfg_scale: f64,
    pub steps: u32,
}
