/*
 * Responsibility
 * - UserProfile: normalized identity record stored in the session
 * - ProfileBuilder: validated Credentials -> UserProfile, then the per-client
 *   authorization generators (pure UserProfile -> UserProfile functions)
 */
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::services::auth::clients::Client;
use crate::services::auth::context::WebContext;
use crate::services::auth::credentials::Credentials;
use crate::services::auth::error::{AuthError, AuthResult};

/// Id given to every profile produced by the anonymous client.
pub const ANONYMOUS_PROFILE_ID: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    // Set by the ProfileBuilder from the client that authenticated the user.
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client_name: String::new(),
            attributes: BTreeMap::new(),
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_PROFILE_ID)
    }

    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_PROFILE_ID
    }

    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Post-processing applied to every profile a client produces
/// (e.g. grant `ROLE_ADMIN` to every user of one identity provider).
pub type AuthorizationGenerator = Arc<dyn Fn(UserProfile) -> UserProfile + Send + Sync>;

#[derive(Clone, Default)]
pub struct ProfileBuilder {
    generators: HashMap<String, Vec<AuthorizationGenerator>>,
}

impl std::fmt::Debug for ProfileBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<&str, usize> = self
            .generators
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("ProfileBuilder")
            .field("generators", &counts)
            .finish()
    }
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_generator<F>(&mut self, client_name: impl Into<String>, generator: F)
    where
        F: Fn(UserProfile) -> UserProfile + Send + Sync + 'static,
    {
        self.generators
            .entry(client_name.into())
            .or_default()
            .push(Arc::new(generator));
    }

    /// Extracts and validates credentials for `client`, then builds its profile.
    pub async fn authenticate(
        &self,
        client: &Client,
        ctx: &WebContext,
    ) -> AuthResult<UserProfile> {
        let credentials = client.extract_credentials(ctx).await?;
        self.build(client, credentials).await
    }

    pub async fn build(
        &self,
        client: &Client,
        credentials: Credentials,
    ) -> AuthResult<UserProfile> {
        let mut profile = client.build_profile(credentials).await?;
        if profile.id.trim().is_empty() {
            return Err(AuthError::profile_build(format!(
                "client {} produced a profile without id",
                client.name()
            )));
        }
        profile.client_name = client.name().to_string();

        let generators = self.generators.get(client.name()).into_iter().flatten();
        Ok(generators.fold(profile, |profile, generator| generator(profile)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::clients::direct::AnonymousClient;

    #[tokio::test]
    async fn stamps_client_name_and_applies_generators_in_order() {
        let mut builder = ProfileBuilder::new();
        builder.add_generator("AnonymousClient", |p| p.with_role("ROLE_USER"));
        builder.add_generator("AnonymousClient", |p| {
            let admin = p.has_role("ROLE_USER");
            if admin { p.with_role("ROLE_ADMIN") } else { p }
        });
        builder.add_generator("OtherClient", |p| p.with_role("ROLE_OTHER"));

        let client = Client::direct(AnonymousClient::new());
        let profile = builder
            .build(&client, Credentials::anonymous())
            .await
            .unwrap();

        assert_eq!(profile.client_name, "AnonymousClient");
        assert!(profile.has_role("ROLE_USER"));
        assert!(profile.has_role("ROLE_ADMIN"));
        assert!(!profile.has_role("ROLE_OTHER"));
    }

    #[test]
    fn anonymous_profile_is_recognised() {
        assert!(UserProfile::anonymous().is_anonymous());
        assert!(!UserProfile::new("jle").is_anonymous());
    }
}
