use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use clap::Parser;

mod cli;

use bgate_bedrock::ClientPool;
use bgate_common::GlobalConfigPatch;
use bgate_core::{AuthKeyEntry, AuthProvider, Core, MemoryAuth, ModelRegistry, NoopAuth};
use tracing::info;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("bgate failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut patch = GlobalConfigPatch::default();
    patch.overlay(cli.patch());
    let config = patch.into_config()?;
    info!(
        host = %config.host,
        port = config.port,
        region = %config.region,
        model_owner = %config.model_owner,
        "config loaded"
    );

    // Credentials are read lazily on the first invocation, so the
    // gateway can boot before its AWS environment is in place.
    let pool = Arc::new(ClientPool::new());
    let invoker = Arc::new(pool.invoker(&config.region));

    let auth: Arc<dyn AuthProvider> = if cli.api_keys.is_empty() {
        info!("no api keys configured; authentication disabled");
        Arc::new(NoopAuth)
    } else {
        let keys = cli
            .api_keys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                (
                    key.clone(),
                    AuthKeyEntry {
                        account_id: format!("acct-{index}"),
                        tier: None,
                        enabled: true,
                    },
                )
            })
            .collect::<HashMap<_, _>>();
        info!(api_keys = keys.len(), "key-table authentication enabled");
        Arc::new(MemoryAuth::new(keys))
    };

    let registry = ModelRegistry::new(&config.model_owner);
    let bind = format!("{}:{}", config.host, config.port);
    let core = Core::new(config, registry, invoker, auth);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(addr = %bind, "listening");
    axum::serve(listener, core.router()).await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bgate=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
