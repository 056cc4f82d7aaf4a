use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::services::session::store::{SessionResult, SessionStore};

const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Entry {
    attrs: HashMap<String, String>,
    last_access: Instant,
}

/// Process-local session store.
///
/// A session idle for longer than the TTL is dropped on its next access, and
/// by [`MemorySessionStore::spawn_sweeper`] for sessions nobody comes back to.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_access) > self.ttl
    }

    /// Drops every idle session; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        before - sessions.len()
    }

    /// Runs [`Self::purge_expired`] every `every` until the store is dropped.
    pub fn spawn_sweeper(store: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(store);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            // first tick completes immediately
            tick.tick().await;
            loop {
                tick.tick().await;
                let Some(store) = weak.upgrade() else {
                    break;
                };
                let removed = store.purge_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "expired sessions dropped");
                }
            }
        })
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, session_id: &str, key: &str) -> SessionResult<Option<String>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get(session_id) {
            Some(entry) => self.is_expired(entry, now),
            None => return Ok(None),
        };
        if expired {
            sessions.remove(session_id);
            return Ok(None);
        }
        let Some(entry) = sessions.get_mut(session_id) else {
            return Ok(None);
        };
        entry.last_access = now;
        Ok(entry.attrs.get(key).cloned())
    }

    async fn entries(&self, session_id: &str) -> SessionResult<HashMap<String, String>> {
        let now = Instant::now();
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.attrs.clone())
            .unwrap_or_default())
    }

    async fn put(&self, session_id: &str, key: &str, value: String) -> SessionResult<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Entry {
                attrs: HashMap::new(),
                last_access: now,
            });
        if self.is_expired(entry, now) {
            entry.attrs.clear();
        }
        entry.last_access = now;
        entry.attrs.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, session_id: &str, key: &str) -> SessionResult<()> {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.attrs.remove(key);
            if entry.attrs.is_empty() {
                sessions.remove(session_id);
            }
        }
        Ok(())
    }

    async fn invalidate(&self, session_id: &str) -> SessionResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
