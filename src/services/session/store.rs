//! Session store interface used by the authentication pipeline.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for session store operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-layer errors (transport/command/serialization).
///
/// Kept independent from `AuthError` so the pipeline decides how to surface a
/// failing backend (it always maps to 500).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session backend connection error: {0}")]
    BackendConnection(String),
    #[error("session backend command error: {0}")]
    BackendCommand(String),
    #[error("session value error: {0}")]
    InvalidValue(#[from] serde_json::Error),
}

/// Key/value storage scoped to a session id.
///
/// Values are opaque strings; typed access (profiles, requested url) lives on
/// [`super::Session`]. Implementations must give per-session isolation: two
/// concurrent writes for the same session id must not lose an update of the
/// same key.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn get(&self, session_id: &str, key: &str) -> SessionResult<Option<String>>;

    // Every key of the session; empty when it does not exist.
    async fn entries(&self, session_id: &str) -> SessionResult<HashMap<String, String>>;

    async fn put(&self, session_id: &str, key: &str, value: String) -> SessionResult<()>;

    async fn remove(&self, session_id: &str, key: &str) -> SessionResult<()>;

    // Drop every key of the session.
    async fn invalidate(&self, session_id: &str) -> SessionResult<()>;
}

pub type SharedSessionStore = Arc<dyn SessionStore>;
