use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bgate_common::ApiError;
use bgate_core::{ModelInvoker, NativeChunkStream};
use bytes::Bytes;

use crate::client::BedrockClient;
use crate::sign::Credentials;

/// Lazily built, memoized per-region clients. Handles live for the
/// process lifetime. Two tasks racing on first use of a region may both
/// build a client; the map keeps the first insert and the loser's build
/// is dropped, which is harmless.
#[derive(Default)]
pub struct ClientPool {
    clients: RwLock<HashMap<String, Arc<BedrockClient>>>,
}

impl ClientPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`ModelInvoker`] bound to one region that defers client
    /// construction (and so the credential lookup) to the first
    /// invocation.
    pub fn invoker(self: &Arc<Self>, region: impl Into<String>) -> PooledInvoker {
        PooledInvoker {
            pool: self.clone(),
            region: region.into(),
        }
    }

    pub fn handle(&self, region: &str) -> Result<Arc<BedrockClient>, ApiError> {
        if let Some(client) = self
            .clients
            .read()
            .map_err(|_| ApiError::internal("client pool lock poisoned"))?
            .get(region)
        {
            return Ok(client.clone());
        }

        let built = Arc::new(BedrockClient::new(region, Credentials::from_env()?)?);
        let mut guard = self
            .clients
            .write()
            .map_err(|_| ApiError::internal("client pool lock poisoned"))?;
        Ok(guard.entry(region.to_string()).or_insert(built).clone())
    }
}

pub struct PooledInvoker {
    pool: Arc<ClientPool>,
    region: String,
}

#[async_trait]
impl ModelInvoker for PooledInvoker {
    async fn invoke(&self, model_id: &str, payload: Bytes) -> Result<Bytes, ApiError> {
        self.pool.handle(&self.region)?.invoke(model_id, payload).await
    }

    async fn invoke_stream(
        &self,
        model_id: &str,
        payload: Bytes,
    ) -> Result<NativeChunkStream, ApiError> {
        self.pool
            .handle(&self.region)?
            .invoke_stream(model_id, payload)
            .await
    }
}
