use bgate_common::GlobalConfigPatch;
use clap::Parser;

#[derive(Parser)]
#[command(name = "bgate")]
pub(crate) struct Cli {
    #[arg(long, env = "BGATE_HOST")]
    pub(crate) host: Option<String>,
    #[arg(long, env = "BGATE_PORT")]
    pub(crate) port: Option<u16>,
    /// AWS region the Bedrock runtime is invoked in.
    #[arg(long, env = "AWS_REGION")]
    pub(crate) region: Option<String>,
    #[arg(long, env = "BGATE_DEFAULT_MAX_TOKENS")]
    pub(crate) default_max_tokens: Option<u32>,
    #[arg(long, env = "BGATE_DEFAULT_TEMPERATURE")]
    pub(crate) default_temperature: Option<f64>,
    #[arg(long, env = "BGATE_DEFAULT_TOP_P")]
    pub(crate) default_top_p: Option<f64>,
    #[arg(long, env = "BGATE_MODEL_OWNER")]
    pub(crate) model_owner: Option<String>,
    /// Accepted api keys; when empty, authentication is disabled.
    #[arg(long = "api-key", env = "BGATE_API_KEYS", value_delimiter = ',')]
    pub(crate) api_keys: Vec<String>,
}

impl Cli {
    pub(crate) fn patch(&self) -> GlobalConfigPatch {
        GlobalConfigPatch {
            host: self.host.clone(),
            port: self.port,
            region: self.region.clone(),
            default_max_tokens: self.default_max_tokens,
            default_temperature: self.default_temperature,
            default_top_p: self.default_top_p,
            model_owner: self.model_owner.clone(),
        }
    }
}
