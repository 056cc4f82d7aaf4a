/*
 * Responsibility
 * - Session store interface + backends (memory / valkey)
 * - `Session`: explicit handle (id + store) passed through every pipeline call
 * - typed access to the two well-known keys: profiles and requested url
 */
pub mod memory;
pub mod profiles;
pub mod store;
pub mod valkey;

use serde::{Serialize, de::DeserializeOwned};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

pub use memory::MemorySessionStore;
pub use profiles::SessionProfiles;
pub use store::{SessionError, SessionResult, SessionStore, SharedSessionStore};
pub use valkey::ValkeySessionStore;

use crate::services::auth::profile::UserProfile;

/// Session key holding [`SessionProfiles`].
pub const PROFILES_KEY: &str = "authgate.profiles";
/// Session key holding the url requested before an indirect login started.
pub const REQUESTED_URL_KEY: &str = "authgate.requestedUrl";

/// Mints a session id: a simple (32 hex digit) v4 uuid.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Per-request session handle.
///
/// Clones share the id, so a [`Session::renew`] made deep in the pipeline is
/// seen by the session middleware when it writes the cookie.
#[derive(Clone)]
pub struct Session {
    id: Arc<RwLock<String>>,
    store: SharedSessionStore,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id())
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

impl Session {
    pub fn new(id: impl Into<String>, store: SharedSessionStore) -> Self {
        Self {
            id: Arc::new(RwLock::new(id.into())),
            store,
        }
    }

    pub fn id(&self) -> String {
        self.id.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> SessionResult<Option<T>> {
        match self.store.get(&self.id(), key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> SessionResult<()> {
        let raw = serde_json::to_string(value)?;
        self.store.put(&self.id(), key, raw).await
    }

    pub async fn remove(&self, key: &str) -> SessionResult<()> {
        self.store.remove(&self.id(), key).await
    }

    /// Moves every key to a freshly minted id and drops the old session.
    /// Returns the new id.
    pub async fn renew(&self) -> SessionResult<String> {
        let old_id = self.id();
        let new_id = new_session_id();

        for (key, value) in self.store.entries(&old_id).await? {
            self.store.put(&new_id, &key, value).await?;
        }
        self.store.invalidate(&old_id).await?;

        *self.id.write().unwrap_or_else(PoisonError::into_inner) = new_id.clone();
        Ok(new_id)
    }

    pub async fn profiles(&self) -> SessionResult<SessionProfiles> {
        Ok(self.get(PROFILES_KEY).await?.unwrap_or_default())
    }

    // read-modify-write; relies on the store's per-session isolation
    pub async fn save_profile(&self, profile: UserProfile) -> SessionResult<()> {
        let mut profiles = self.profiles().await?;
        profiles.insert(profile);
        self.put(PROFILES_KEY, &profiles).await
    }

    pub async fn clear_profiles(&self) -> SessionResult<()> {
        self.remove(PROFILES_KEY).await
    }

    pub async fn set_requested_url(&self, url: &str) -> SessionResult<()> {
        self.put(REQUESTED_URL_KEY, &url).await
    }

    /// Returns the saved requested url and removes it from the session.
    pub async fn take_requested_url(&self) -> SessionResult<Option<String>> {
        let url: Option<String> = self.get(REQUESTED_URL_KEY).await?;
        if url.is_some() {
            self.remove(REQUESTED_URL_KEY).await?;
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, store: &Arc<MemorySessionStore>) -> Session {
        Session::new(id, store.clone() as SharedSessionStore)
    }

    fn profile(id: &str, client: &str) -> UserProfile {
        let mut p = UserProfile::new(id);
        p.client_name = client.to_string();
        p
    }

    #[tokio::test]
    async fn profiles_are_empty_until_first_save() {
        let store = Arc::new(MemorySessionStore::default());
        let s = session("s1", &store);

        assert!(s.profiles().await.unwrap().is_empty());

        s.save_profile(profile("alice", "FormClient")).await.unwrap();
        let profiles = s.profiles().await.unwrap();
        assert_eq!(profiles.get("FormClient").map(|p| p.id.as_str()), Some("alice"));
    }

    #[tokio::test]
    async fn clear_profiles_empties_every_client_entry() {
        let store = Arc::new(MemorySessionStore::default());
        let s = session("s1", &store);
        s.save_profile(profile("alice", "FormClient")).await.unwrap();
        s.save_profile(profile("bob", "ParameterClient")).await.unwrap();

        s.clear_profiles().await.unwrap();

        assert!(s.profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn requested_url_is_consumed_once() {
        let store = Arc::new(MemorySessionStore::default());
        let s = session("s1", &store);
        s.set_requested_url("/form/index.html?x=1").await.unwrap();

        assert_eq!(
            s.take_requested_url().await.unwrap().as_deref(),
            Some("/form/index.html?x=1")
        );
        assert_eq!(s.take_requested_url().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_values_surface_as_invalid_value() {
        let store = Arc::new(MemorySessionStore::default());
        store
            .put("s1", PROFILES_KEY, "not json".into())
            .await
            .unwrap();
        let s = session("s1", &store);

        assert!(matches!(
            s.profiles().await,
            Err(SessionError::InvalidValue(_))
        ));
    }

    #[tokio::test]
    async fn renew_moves_the_data_to_a_new_id() {
        let store = Arc::new(MemorySessionStore::default());
        let s = session("0123456789abcdef0123456789abcdef", &store);
        s.save_profile(profile("alice", "FormClient")).await.unwrap();
        s.set_requested_url("/x").await.unwrap();
        let before = s.id();
        let seen_by_clone = s.clone();

        let after = s.renew().await.unwrap();

        assert_ne!(after, before);
        assert_eq!(seen_by_clone.id(), after);
        assert!(store.entries(&before).await.unwrap().is_empty());
        assert_eq!(store.entries(&after).await.unwrap().len(), 2);
        assert_eq!(
            s.profiles().await.unwrap().get("FormClient").map(|p| p.id.as_str()),
            Some("alice")
        );
    }
}
