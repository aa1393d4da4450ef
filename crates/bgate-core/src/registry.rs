use bgate_common::ApiError;
use bgate_protocol::openai::list_models::response::{ModelDescriptor, ModelObjectType};

use crate::dispatch::now_epoch_seconds;

/// External model name -> Bedrock model id. Exact match only; an unknown
/// name is a client error, never a silent fallback.
const MODEL_ALIASES: &[(&str, &str)] = &[
    ("gpt-4", "anthropic.claude-3-opus-20240229-v1:0"),
    ("gpt-4-0613", "anthropic.claude-3-opus-20240229-v1:0"),
    ("gpt-4-32k", "anthropic.claude-3-opus-20240229-v1:0"),
    ("gpt-4-32k-0613", "anthropic.claude-3-opus-20240229-v1:0"),
    ("gpt-4-0125-preview", "anthropic.claude-3-sonnet-20240229-v1:0"),
    ("gpt-3.5-turbo", "anthropic.claude-3-haiku-20240307-v1:0"),
    ("gpt-3.5-turbo-0613", "anthropic.claude-3-haiku-20240307-v1:0"),
    ("gpt-3.5-turbo-16k", "anthropic.claude-3-haiku-20240307-v1:0"),
    ("gpt-3.5-turbo-16k-0613", "anthropic.claude-3-haiku-20240307-v1:0"),
    ("gpt-4-llama", "meta.llama3-70b-instruct-v1:0"),
    ("gpt-3.5-turbo-llama", "meta.llama3-8b-instruct-v1:0"),
    ("text-embedding-ada-002", "amazon.titan-embed-text-v1"),
    ("text-embedding-3-small", "amazon.titan-embed-text-v2:0"),
    ("text-embedding-3-large", "cohere.embed-english-v3"),
    ("dall-e-3", "stability.stable-diffusion-xl-v1"),
];

/// Closed set of Bedrock provider families the gateway can translate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    Anthropic,
    Meta,
    Cohere,
    Amazon,
    Stability,
}

impl ProviderFamily {
    /// The family tag is the segment of the Bedrock model id before the
    /// first `.` (`anthropic.claude-3-...` -> Anthropic).
    pub fn from_model_id(model_id: &str) -> Result<Self, ApiError> {
        let tag = model_id.split('.').next().unwrap_or_default();
        match tag {
            "anthropic" => Ok(Self::Anthropic),
            "meta" => Ok(Self::Meta),
            "cohere" => Ok(Self::Cohere),
            "amazon" => Ok(Self::Amazon),
            "stability" => Ok(Self::Stability),
            _ => Err(ApiError::bad_request(format!(
                "unsupported model provider '{tag}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Meta => "meta",
            Self::Cohere => "cohere",
            Self::Amazon => "amazon",
            Self::Stability => "stability",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// The name the caller asked for; echoed back in responses.
    pub external: String,
    pub bedrock_id: String,
    pub family: ProviderFamily,
}

#[derive(Debug)]
pub struct ModelRegistry {
    owner: String,
    /// Stable listing timestamp, fixed when the registry is built.
    created: i64,
}

impl ModelRegistry {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            created: now_epoch_seconds(),
        }
    }

    pub fn resolve(&self, external: &str) -> Result<ResolvedModel, ApiError> {
        let bedrock_id = MODEL_ALIASES
            .iter()
            .find(|(alias, _)| *alias == external)
            .map(|(_, id)| *id)
            .ok_or_else(|| ApiError::bad_request(format!("unknown model '{external}'")))?;

        Ok(ResolvedModel {
            external: external.to_string(),
            bedrock_id: bedrock_id.to_string(),
            family: ProviderFamily::from_model_id(bedrock_id)?,
        })
    }

    pub fn aliases(&self) -> Vec<ModelDescriptor> {
        MODEL_ALIASES
            .iter()
            .map(|(alias, _)| ModelDescriptor {
                id: alias.to_string(),
                object: ModelObjectType::Model,
                created: self.created,
                owned_by: self.owner.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exact_aliases() {
        let registry = ModelRegistry::new("aws-bedrock");

        let resolved = registry.resolve("gpt-4").expect("gpt-4 resolves");
        assert_eq!(resolved.bedrock_id, "anthropic.claude-3-opus-20240229-v1:0");
        assert_eq!(resolved.family, ProviderFamily::Anthropic);
        assert_eq!(resolved.external, "gpt-4");

        let resolved = registry.resolve("gpt-4-llama").expect("llama resolves");
        assert_eq!(resolved.family, ProviderFamily::Meta);
    }

    #[test]
    fn miss_is_a_bad_request_not_a_fallback() {
        let registry = ModelRegistry::new("aws-bedrock");
        let err = registry.resolve("gpt-5").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        // A prefix of a known alias is still a miss.
        let err = registry.resolve("gpt-4-").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn every_alias_maps_to_a_known_family() {
        for (alias, id) in MODEL_ALIASES {
            ProviderFamily::from_model_id(id)
                .unwrap_or_else(|_| panic!("alias {alias} has unknown family"));
        }
    }

    #[test]
    fn unknown_family_tag_is_rejected() {
        let err = ProviderFamily::from_model_id("mistral.mixtral-8x7b").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(err.public_message().contains("mistral"));
    }

    #[test]
    fn listing_is_stable_and_tagged() {
        let registry = ModelRegistry::new("aws-bedrock");
        let listing = registry.aliases();
        assert_eq!(listing.len(), MODEL_ALIASES.len());
        assert!(listing.iter().all(|entry| entry.owned_by == "aws-bedrock"));
        let again = registry.aliases();
        assert_eq!(listing[0].created, again[0].created);
    }
}
