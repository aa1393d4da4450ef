use serde::{Deserialize, Serialize};

/// Role of an inbound chat message. Roles the gateway does not model
/// fall into `Other` instead of failing deserialization; the request
/// transforms decide what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    System,
    User,
    Assistant,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,
    pub content: String,
}

/// Role reported on outbound choices. Always `assistant` today, but kept
/// as its own type so responses cannot echo an inbound role by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatResponseRole {
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatFinishReason {
    Stop,
    Length,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl CompletionUsage {
    /// `total_tokens` is always the sum, never independently reported.
    pub fn from_counts(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_deserialize_as_other() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"role":"tool","content":"x"}"#).expect("deserialize");
        assert_eq!(message.role, ChatMessageRole::Other);
    }

    #[test]
    fn usage_total_is_the_sum() {
        let usage = CompletionUsage::from_counts(5, 1);
        assert_eq!(usage.total_tokens, 6);
    }
}
