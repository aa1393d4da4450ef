use serde::{Deserialize, Serialize};

/// Native invocation body for Cohere Command models behind Bedrock.
/// Bedrock spells nucleus sampling `p`, not `top_p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohereInvocationPayload {
    pub prompt: String,
    pub temperature: f64,
    pub p: f64,
    pub max_tokens: u32,
    pub stop_sequences: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohereGeneration {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohereResponse {
    #[serde(default)]
    pub generations: Vec<CohereGeneration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohereStreamChunk {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub is_finished: Option<bool>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_response_generations() {
        let response: CohereResponse = serde_json::from_str(
            r#"{"generations":[{"id":"g1","text":"Hello","finish_reason":"COMPLETE"}]}"#,
        )
        .expect("deserialize cohere response");
        assert_eq!(response.generations[0].text, "Hello");
        assert_eq!(
            response.generations[0].finish_reason.as_deref(),
            Some("COMPLETE")
        );
    }
}
