//! Credential validators plugged into the built-in clients.
use async_trait::async_trait;
use std::sync::Arc;

use crate::services::auth::credentials::{CredentialMaterial, Credentials};
use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::profile::UserProfile;

/// Validates credentials and attaches the profile derived from them.
///
/// Returns `InvalidCredentials` for anything malformed, expired or forged.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn validate(&self, credentials: Credentials) -> AuthResult<Credentials>;
}

pub type SharedAuthenticator = Arc<dyn Authenticator>;

/// Accepts any username/password pair where both are equal. Demo only.
#[derive(Debug, Clone, Default)]
pub struct SimpleTestUsernamePasswordAuthenticator;

impl SimpleTestUsernamePasswordAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for SimpleTestUsernamePasswordAuthenticator {
    async fn validate(&self, credentials: Credentials) -> AuthResult<Credentials> {
        let profile = match credentials.material() {
            CredentialMaterial::UsernamePassword { username, password } => {
                if username.is_empty() {
                    return Err(AuthError::invalid_credentials("username cannot be blank"));
                }
                if password.is_empty() {
                    return Err(AuthError::invalid_credentials("password cannot be blank"));
                }
                if username != password {
                    return Err(AuthError::invalid_credentials(
                        "username and password do not match",
                    ));
                }
                UserProfile::new(username.clone()).with_attribute("username", username.clone())
            }
            _ => {
                return Err(AuthError::invalid_credentials(
                    "expected username/password credentials",
                ));
            }
        };

        Ok(credentials.with_user_profile(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_matching_username_and_password() {
        let auth = SimpleTestUsernamePasswordAuthenticator::new();
        let creds = auth
            .validate(Credentials::username_password("jle", "jle"))
            .await
            .unwrap();

        let profile = creds.user_profile().unwrap();
        assert_eq!(profile.id, "jle");
        assert_eq!(profile.attribute("username"), Some(&serde_json::json!("jle")));
    }

    #[tokio::test]
    async fn rejects_mismatch_and_blank_values() {
        let auth = SimpleTestUsernamePasswordAuthenticator::new();

        for (u, p) in [("jle", "other"), ("", ""), ("jle", "")] {
            let res = auth.validate(Credentials::username_password(u, p)).await;
            assert!(matches!(res, Err(AuthError::InvalidCredentials(_))), "{u}/{p}");
        }
    }

    #[tokio::test]
    async fn rejects_other_credential_kinds() {
        let auth = SimpleTestUsernamePasswordAuthenticator::new();
        let res = auth.validate(Credentials::token("abc")).await;
        assert!(matches!(res, Err(AuthError::InvalidCredentials(_))));
    }
}
