//! Sources for the upstream API key.

use secrecy::{ExposeSecret, Secret};

/// Read-only access to the upstream credential.
///
/// Looked up on every request so that handlers never cache the key.
pub trait CredentialProvider: Send + Sync {
    /// Returns the key, or `None` when it is unset or blank.
    fn api_key(&self) -> Option<Secret<String>>;
}

/// Reads the key from a process environment variable at call time.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn api_key(&self) -> Option<Secret<String>> {
        std::env::var(&self.var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Secret::new)
    }
}

/// A fixed key (or fixed absence of one).
#[derive(Debug)]
pub struct StaticCredentialProvider {
    key: Option<Secret<String>>,
}

impl StaticCredentialProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(Secret::new(key.into())),
        }
    }

    pub fn missing() -> Self {
        Self { key: None }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn api_key(&self) -> Option<Secret<String>> {
        self.key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.trim().is_empty())
            .map(|key| Secret::new(key.clone()))
    }
}
