//! Named access-control predicates over the authenticated profiles.
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::profile::UserProfile;

pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, profiles: &[UserProfile]) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&[UserProfile]) -> bool + Send + Sync,
{
    fn is_authorized(&self, profiles: &[UserProfile]) -> bool {
        self(profiles)
    }
}

fn roles_of(profiles: &[UserProfile]) -> BTreeSet<&str> {
    profiles
        .iter()
        .flat_map(|p| p.roles.iter().map(String::as_str))
        .collect()
}

/// Grants access when the union of all profile roles contains any required role.
#[derive(Debug, Clone)]
pub struct RequireAnyRole {
    roles: BTreeSet<String>,
}

impl RequireAnyRole {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorizer for RequireAnyRole {
    fn is_authorized(&self, profiles: &[UserProfile]) -> bool {
        let held = roles_of(profiles);
        self.roles.iter().any(|r| held.contains(r.as_str()))
    }
}

#[derive(Clone, Default)]
pub struct AuthorizerRegistry {
    authorizers: HashMap<String, Arc<dyn Authorizer>>,
}

impl std::fmt::Debug for AuthorizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.authorizers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("AuthorizerRegistry")
            .field("names", &names)
            .finish()
    }
}

impl AuthorizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        authorizer: impl Authorizer + 'static,
    ) -> AuthResult<()> {
        let name = name.into();
        if self.authorizers.contains_key(&name) {
            return Err(AuthError::DuplicateName {
                kind: "authorizer",
                name,
            });
        }
        self.authorizers.insert(name, Arc::new(authorizer));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.authorizers.contains_key(name)
    }

    pub fn evaluate(&self, name: &str, profiles: &[UserProfile]) -> AuthResult<bool> {
        let authorizer = self
            .authorizers
            .get(name)
            .ok_or_else(|| AuthError::AuthorizerNotFound(name.to_string()))?;
        Ok(authorizer.is_authorized(profiles))
    }
}
