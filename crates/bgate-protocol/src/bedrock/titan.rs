use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanGenerationConfig {
    pub max_token_count: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub stop_sequences: Vec<String>,
}

/// Native invocation body for Amazon Titan text models behind Bedrock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanInvocationPayload {
    pub input_text: String,
    pub text_generation_config: TitanGenerationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanResult {
    #[serde(default)]
    pub output_text: String,
    #[serde(default)]
    pub token_count: Option<u32>,
    #[serde(default)]
    pub completion_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanResponse {
    #[serde(default)]
    pub input_text_token_count: Option<u32>,
    #[serde(default)]
    pub results: Vec<TitanResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanStreamChunk {
    #[serde(default)]
    pub output_text: Option<String>,
    #[serde(default)]
    pub input_text_token_count: Option<u32>,
    #[serde(default)]
    pub total_output_text_token_count: Option<u32>,
    #[serde(default)]
    pub completion_reason: Option<String>,
}
