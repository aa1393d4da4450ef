use std::collections::HashMap;

use bgate_common::ApiError;
use http::HeaderMap;

/// Identity attached to a request once authentication succeeds. Handlers
/// trust it; they never re-check credentials.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub account_id: Option<String>,
    pub tier: Option<String>,
}

pub trait AuthProvider: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, ApiError>;
}

/// Accepts everything; the default when the gateway fronts a trusted
/// network.
#[derive(Debug, Default)]
pub struct NoopAuth;

impl AuthProvider for NoopAuth {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<AuthContext, ApiError> {
        Ok(AuthContext::default())
    }
}

#[derive(Debug, Clone)]
pub struct AuthKeyEntry {
    pub account_id: String,
    pub tier: Option<String>,
    pub enabled: bool,
}

/// In-memory api-key table, fixed at startup.
#[derive(Debug, Default)]
pub struct MemoryAuth {
    keys: HashMap<String, AuthKeyEntry>,
}

impl MemoryAuth {
    pub fn new(keys: HashMap<String, AuthKeyEntry>) -> Self {
        Self { keys }
    }
}

impl AuthProvider for MemoryAuth {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, ApiError> {
        let api_key = extract_api_key(headers)
            .ok_or_else(|| ApiError::Authentication("missing api key".to_string()))?;

        // An unknown key is a bad credential, not a permission problem.
        let entry = self
            .keys
            .get(api_key.as_str())
            .ok_or_else(|| ApiError::Authentication("invalid api key".to_string()))?;

        if !entry.enabled {
            return Err(ApiError::Authorization("api key disabled".to_string()));
        }

        Ok(AuthContext {
            account_id: Some(entry.account_id.clone()),
            tier: entry.tier.clone(),
        })
    }
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = header_value(headers, "x-api-key") {
        return Some(value);
    }

    let auth = header_value(headers, "authorization")?;
    let auth = auth.trim();
    if let Some(token) = auth.strip_prefix("Bearer ") {
        return Some(token.trim().to_string());
    }
    if let Some(token) = auth.strip_prefix("bearer ") {
        return Some(token.trim().to_string());
    }
    None
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}
