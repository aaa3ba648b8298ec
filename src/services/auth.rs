//! Bearer-token context for the listing endpoint
//!
//! Credentials are passed explicitly to whatever needs them instead of being
//! read from ambient globals at request time.

use std::fmt;
use std::sync::Arc;

/// Supplies the current access token, if any
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// A fixed token
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone()).filter(|t| !t.is_empty())
    }
}

/// Reads the token from an environment variable on every request, so a
/// rotated token is picked up without restarting
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvToken {
    fn token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|t| !t.trim().is_empty())
    }
}

/// Authentication handed to backends
#[derive(Clone, Default)]
pub struct AuthContext {
    provider: Option<Arc<dyn TokenProvider>>,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the token itself
        f.debug_struct("AuthContext")
            .field("authenticated", &self.provider.is_some())
            .finish()
    }
}

impl AuthContext {
    /// No credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(Arc::new(StaticToken::new(token)))
    }

    pub fn from_env(var: impl Into<String>) -> Self {
        Self::new(Arc::new(EnvToken::new(var)))
    }

    pub fn token(&self) -> Option<String> {
        self.provider.as_ref().and_then(|p| p.token())
    }

    /// Value for the `Authorization` header
    pub fn bearer_header(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {t}"))
    }
}
