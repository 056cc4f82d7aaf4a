use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::services::session::store::{SessionError, SessionResult, SessionStore};

/// Valkey/Redis-backed session store.
///
/// Each session is one hash at `<prefix>:<session id>`; every write refreshes
/// the hash TTL so idle sessions expire on the server side.
#[derive(Clone)]
pub struct ValkeySessionStore {
    manager: redis::aio::ConnectionManager,
    prefix: String,
    ttl: Duration,
}

impl std::fmt::Debug for ValkeySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValkeySessionStore")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ValkeySessionStore {
    // Connect to a URL like `redis://localhost:6379`
    pub async fn new(url: &str, ttl: Duration) -> SessionResult<Self> {
        Self::new_with_prefix(url, "authgate:session", ttl).await
    }

    pub async fn new_with_prefix(
        url: &str,
        prefix: impl Into<String>,
        ttl: Duration,
    ) -> SessionResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| SessionError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| SessionError::BackendConnection(e.to_string()))?;

        Ok(Self {
            manager,
            prefix: prefix.into(),
            ttl,
        })
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}:{}", self.prefix, session_id)
    }
}

#[async_trait]
impl SessionStore for ValkeySessionStore {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get(&self, session_id: &str, key: &str) -> SessionResult<Option<String>> {
        let mut conn = self.manager.clone();

        let value: Option<String> = redis::cmd("HGET")
            .arg(self.key(session_id))
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionError::BackendCommand(e.to_string()))?;

        Ok(value)
    }

    async fn entries(&self, session_id: &str) -> SessionResult<HashMap<String, String>> {
        let mut conn = self.manager.clone();

        let entries: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(self.key(session_id))
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionError::BackendCommand(e.to_string()))?;

        Ok(entries)
    }

    async fn put(&self, session_id: &str, key: &str, value: String) -> SessionResult<()> {
        let mut conn = self.manager.clone();
        let hash = self.key(session_id);

        // EXPIRE expects integer seconds; clamp to at least 1 sec.
        let ttl_seconds = self.ttl.as_secs().max(1);

        let _: () = redis::pipe()
            .atomic()
            .cmd("HSET")
            .arg(&hash)
            .arg(key)
            .arg(value)
            .ignore()
            .cmd("EXPIRE")
            .arg(&hash)
            .arg(ttl_seconds)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionError::BackendCommand(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, session_id: &str, key: &str) -> SessionResult<()> {
        let mut conn = self.manager.clone();

        let _: u64 = redis::cmd("HDEL")
            .arg(self.key(session_id))
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionError::BackendCommand(e.to_string()))?;

        Ok(())
    }

    async fn invalidate(&self, session_id: &str) -> SessionResult<()> {
        let mut conn = self.manager.clone();

        let _: u64 = redis::cmd("DEL")
            .arg(self.key(session_id))
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionError::BackendCommand(e.to_string()))?;

        Ok(())
    }
}
