use std::fmt;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("missing Authorization header")]
    MissingAuthorization,
    #[error("Authorization header must be a bearer token")]
    MalformedAuthorization,
}

/// The caller's identity for one request, passed explicitly to everything
/// that talks upstream.
///
/// A context is created from the bearer token the UI received at login and
/// is never stored beyond the request that carried it. Logging out discards
/// the live workout session keyed by it; a token refresh moves that session
/// to the new token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    access_token: String,
}

impl SessionContext {
    pub fn new(access_token: impl Into<String>) -> Result<Self, ContextError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(ContextError::MalformedAuthorization);
        }
        Ok(Self { access_token })
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ContextError> {
        let auth_header = headers
            .get(AUTHORIZATION)
            .ok_or(ContextError::MissingAuthorization)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| ContextError::MalformedAuthorization)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or(ContextError::MalformedAuthorization)?;

        Self::new(token.trim())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Key of the live workout session owned by this caller.
    pub fn session_key(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("access_token", &"<redacted>")
            .finish()
    }
}
