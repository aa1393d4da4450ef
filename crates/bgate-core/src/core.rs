use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use bgate_common::GlobalConfig;

use crate::auth::AuthProvider;
use crate::handler::{chat_completions, list_models, method_not_allowed, not_found};
use crate::invoker::ModelInvoker;
use crate::registry::ModelRegistry;

pub struct CoreState {
    pub config: GlobalConfig,
    pub registry: ModelRegistry,
    pub invoker: Arc<dyn ModelInvoker>,
    pub auth: Arc<dyn AuthProvider>,
}

pub struct Core {
    state: Arc<CoreState>,
}

impl Core {
    pub fn new(
        config: GlobalConfig,
        registry: ModelRegistry,
        invoker: Arc<dyn ModelInvoker>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            state: Arc::new(CoreState {
                config,
                registry,
                invoker,
                auth,
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/v1/chat/completions",
                post(chat_completions).fallback(method_not_allowed),
            )
            .route("/v1/models", get(list_models).fallback(method_not_allowed))
            .fallback(not_found)
            .with_state(self.state.clone())
    }

    pub fn state(&self) -> Arc<CoreState> {
        self.state.clone()
    }
}
