use std::collections::BTreeMap;
use std::fmt;

use crate::services::auth::profile::UserProfile;

/// Raw authentication material, one variant per mechanism.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialMaterial {
    UsernamePassword { username: String, password: String },
    // Bearer value / JWT string.
    Token(String),
    // Parameters an identity provider sent back to the callback
    // (`code`, `state`, `SAMLResponse`, `ticket`, ...).
    ProviderResponse(BTreeMap<String, String>),
    Anonymous,
}

/// Opaque, client-specific proof of identity for one login attempt.
///
/// Authenticators may attach the profile they derived while validating; the
/// client then hands it to the profile builder. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    material: CredentialMaterial,
    user_profile: Option<UserProfile>,
}

// Key material / passwords must not end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.material {
            CredentialMaterial::UsernamePassword { .. } => "username_password",
            CredentialMaterial::Token(_) => "token",
            CredentialMaterial::ProviderResponse(_) => "provider_response",
            CredentialMaterial::Anonymous => "anonymous",
        };
        f.debug_struct("Credentials")
            .field("kind", &kind)
            .field("has_profile", &self.user_profile.is_some())
            .finish()
    }
}

impl Credentials {
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::from_material(CredentialMaterial::UsernamePassword {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self::from_material(CredentialMaterial::Token(token.into()))
    }

    pub fn provider_response(params: BTreeMap<String, String>) -> Self {
        Self::from_material(CredentialMaterial::ProviderResponse(params))
    }

    pub fn anonymous() -> Self {
        Self::from_material(CredentialMaterial::Anonymous)
    }

    fn from_material(material: CredentialMaterial) -> Self {
        Self {
            material,
            user_profile: None,
        }
    }

    pub fn material(&self) -> &CredentialMaterial {
        &self.material
    }

    pub fn with_user_profile(mut self, profile: UserProfile) -> Self {
        self.user_profile = Some(profile);
        self
    }

    pub fn user_profile(&self) -> Option<&UserProfile> {
        self.user_profile.as_ref()
    }

    pub fn into_user_profile(self) -> Option<UserProfile> {
        self.user_profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::username_password("jle", "s3cr3t");
        let printed = format!("{creds:?}");

        assert!(printed.contains("username_password"));
        assert!(!printed.contains("s3cr3t"));
        assert!(!printed.contains("jle"));
    }
}
