//! Direct clients: credentials come from the current request, no redirect.
use async_trait::async_trait;
use axum::http::{Method, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::services::auth::authenticator::SharedAuthenticator;
use crate::services::auth::clients::CredentialsClient;
use crate::services::auth::context::WebContext;
use crate::services::auth::credentials::Credentials;
use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::profile::UserProfile;

/// Always authenticates, with a profile whose id is `anonymous`.
#[derive(Debug, Clone)]
pub struct AnonymousClient {
    name: String,
}

impl AnonymousClient {
    pub fn new() -> Self {
        Self::with_name("AnonymousClient")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for AnonymousClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialsClient for AnonymousClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_credentials(&self, _ctx: &WebContext) -> AuthResult<Credentials> {
        Ok(Credentials::anonymous())
    }

    async fn build_profile(&self, _credentials: Credentials) -> AuthResult<UserProfile> {
        Ok(UserProfile::anonymous())
    }
}

/// Reads `Authorization: Basic <base64(user:password)>`.
pub(crate) fn basic_auth_credentials(ctx: &WebContext) -> AuthResult<Credentials> {
    let value = ctx
        .header(header::AUTHORIZATION)
        .ok_or(AuthError::NoCredentials)?;

    // scheme names are case-insensitive
    let encoded = match value.trim_start().split_once(' ') {
        Some((scheme, encoded)) if scheme.eq_ignore_ascii_case("basic") => encoded,
        // Another scheme (e.g. Bearer) is not ours to judge.
        _ => return Err(AuthError::NoCredentials),
    };

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthError::invalid_credentials("bad format of the basic auth header"))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AuthError::invalid_credentials("basic auth header is not utf-8"))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::invalid_credentials("bad format of the basic auth header"))?;

    Ok(Credentials::username_password(username, password))
}

/// HTTP Basic authentication, validated synchronously on every request.
#[derive(Clone)]
pub struct DirectBasicAuthClient {
    name: String,
    authenticator: SharedAuthenticator,
}

impl std::fmt::Debug for DirectBasicAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectBasicAuthClient")
            .field("name", &self.name)
            .finish()
    }
}

impl DirectBasicAuthClient {
    pub fn new(authenticator: SharedAuthenticator) -> Self {
        Self {
            name: "DirectBasicAuthClient".to_string(),
            authenticator,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl CredentialsClient for DirectBasicAuthClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_credentials(&self, ctx: &WebContext) -> AuthResult<Credentials> {
        let credentials = basic_auth_credentials(ctx)?;
        self.authenticator.validate(credentials).await
    }
}

/// Token passed in a named request parameter (query for GET, form for POST).
#[derive(Clone)]
pub struct ParameterClient {
    name: String,
    parameter: String,
    support_get: bool,
    support_post: bool,
    authenticator: SharedAuthenticator,
}

impl std::fmt::Debug for ParameterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterClient")
            .field("name", &self.name)
            .field("parameter", &self.parameter)
            .field("support_get", &self.support_get)
            .field("support_post", &self.support_post)
            .finish()
    }
}

impl ParameterClient {
    /// GET is supported and POST is not until configured otherwise.
    pub fn new(parameter: impl Into<String>, authenticator: SharedAuthenticator) -> Self {
        Self {
            name: "ParameterClient".to_string(),
            parameter: parameter.into(),
            support_get: true,
            support_post: false,
            authenticator,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn support_get(mut self, enabled: bool) -> Self {
        self.support_get = enabled;
        self
    }

    pub fn support_post(mut self, enabled: bool) -> Self {
        self.support_post = enabled;
        self
    }
}

#[async_trait]
impl CredentialsClient for ParameterClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_credentials(&self, ctx: &WebContext) -> AuthResult<Credentials> {
        let value = match *ctx.method() {
            Method::GET if self.support_get => ctx.query_param(&self.parameter),
            Method::POST if self.support_post => ctx.form_param(&self.parameter),
            _ => None,
        };

        let token = value
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoCredentials)?;

        self.authenticator.validate(Credentials::token(token)).await
    }
}
