/*
 * Responsibility
 * - JwtGenerator: signs a UserProfile into an HS256 JWT (GET /jwt.html)
 * - JwtAuthenticator: validates such a token for the ParameterClient and
 *   rebuilds the profile from its claims
 */
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, warn};

use crate::services::auth::authenticator::Authenticator;
use crate::services::auth::credentials::{CredentialMaterial, Credentials};
use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::profile::UserProfile;

/// Shortest accepted HS256 secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

fn check_secret(secret: &[u8]) -> AuthResult<()> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(AuthError::Configuration(format!(
            "jwt secret must be at least {MIN_SECRET_BYTES} bytes"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct JwtGenerator {
    encoding_key: EncodingKey,
    ttl_seconds: u64,
}

impl std::fmt::Debug for JwtGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtGenerator")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl JwtGenerator {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> AuthResult<Self> {
        check_secret(secret)?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            ttl_seconds,
        })
    }

    pub fn generate(&self, profile: &UserProfile) -> AuthResult<String> {
        let now = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let claims = ProfileClaims {
            sub: profile.id.clone(),
            iat: now,
            exp: now.saturating_add(ttl),
            client_name: Some(profile.client_name.clone()).filter(|c| !c.is_empty()),
            roles: profile.roles.iter().cloned().collect(),
            permissions: profile.permissions.iter().cloned().collect(),
            attributes: profile.attributes.clone(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AuthError::profile_build(format!("jwt signing failed: {e}"))
        })
    }
}

#[derive(Clone)]
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtAuthenticator {
    pub fn new(secret: &[u8]) -> AuthResult<Self> {
        check_secret(secret)?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> AuthResult<ProfileClaims> {
        let data = jsonwebtoken::decode::<ProfileClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!(error = %e, "jwt verification failed");
                AuthError::invalid_credentials(format!("jwt verification failed: {e}"))
            })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::invalid_credentials("empty 'sub' claim"));
        }
        Ok(data.claims)
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn validate(&self, credentials: Credentials) -> AuthResult<Credentials> {
        let CredentialMaterial::Token(token) = credentials.material() else {
            return Err(AuthError::invalid_credentials("expected a token"));
        };
        let claims = self.verify(token)?;

        let mut profile = UserProfile::new(claims.sub);
        profile.attributes = claims.attributes;
        profile.roles = claims.roles.into_iter().collect();
        profile.permissions = claims.permissions.into_iter().collect();
        if let Some(origin) = claims.client_name {
            profile = profile.with_attribute("issued_for_client", origin);
        }

        Ok(credentials.with_user_profile(profile))
    }
}
