use serde::{Deserialize, Serialize};

pub mod error;

pub use error::{ApiError, UpstreamDetail};

#[derive(Debug, thiserror::Error)]
pub enum GlobalConfigError {
    #[error("missing required global config field: {0}")]
    MissingField(&'static str),
}

/// Final, merged global configuration used by the running process.
///
/// Merge order: CLI > ENV > built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub host: String,
    pub port: u16,
    /// AWS region the Bedrock runtime is invoked in.
    pub region: String,
    /// Defaults applied when a chat request omits the sampling knobs.
    pub default_max_tokens: u32,
    pub default_temperature: f64,
    pub default_top_p: f64,
    /// Owner tag reported by the model-listing endpoint.
    pub model_owner: String,
}

/// Optional layer used for merging global config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalConfigPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub region: Option<String>,
    pub default_max_tokens: Option<u32>,
    pub default_temperature: Option<f64>,
    pub default_top_p: Option<f64>,
    pub model_owner: Option<String>,
}

impl GlobalConfigPatch {
    pub fn overlay(&mut self, other: GlobalConfigPatch) {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.region.is_some() {
            self.region = other.region;
        }
        if other.default_max_tokens.is_some() {
            self.default_max_tokens = other.default_max_tokens;
        }
        if other.default_temperature.is_some() {
            self.default_temperature = other.default_temperature;
        }
        if other.default_top_p.is_some() {
            self.default_top_p = other.default_top_p;
        }
        if other.model_owner.is_some() {
            self.model_owner = other.model_owner;
        }
    }

    pub fn into_config(self) -> Result<GlobalConfig, GlobalConfigError> {
        Ok(GlobalConfig {
            host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(8080),
            region: self.region.unwrap_or_else(|| "us-east-1".to_string()),
            default_max_tokens: self.default_max_tokens.unwrap_or(4096),
            default_temperature: self.default_temperature.unwrap_or(0.7),
            default_top_p: self.default_top_p.unwrap_or(0.95),
            model_owner: self.model_owner.unwrap_or_else(|| "aws-bedrock".to_string()),
        })
    }
}

impl From<GlobalConfig> for GlobalConfigPatch {
    fn from(value: GlobalConfig) -> Self {
        Self {
            host: Some(value.host),
            port: Some(value.port),
            region: Some(value.region),
            default_max_tokens: Some(value.default_max_tokens),
            default_temperature: Some(value.default_temperature),
            default_top_p: Some(value.default_top_p),
            model_owner: Some(value.model_owner),
        }
    }
}
