use bgate_protocol::openai::chat_completions::request::CreateChatCompletionRequest;

/// Sampling parameters shared by every provider family, extracted once
/// from the inbound request. Each request transform applies its own
/// family defaults to the fields left unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingParams {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub stop_sequences: Vec<String>,
}

impl SamplingParams {
    pub fn from_request(request: &CreateChatCompletionRequest) -> Self {
        Self {
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            stop_sequences: request
                .stop
                .clone()
                .map(|stop| stop.into_sequences())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgate_protocol::openai::chat_completions::request::StopConfiguration;

    #[test]
    fn extracts_each_field_independently() {
        let request = CreateChatCompletionRequest {
            model: "gpt-4".to_string(),
            messages: Vec::new(),
            temperature: Some(0.2),
            max_tokens: None,
            top_p: None,
            stop: Some(StopConfiguration::Single("END".to_string())),
            stream: None,
        };

        let params = SamplingParams::from_request(&request);
        assert_eq!(params.temperature, Some(0.2));
        assert_eq!(params.max_tokens, None);
        assert_eq!(params.top_p, None);
        assert_eq!(params.stop_sequences, vec!["END".to_string()]);
    }
}
