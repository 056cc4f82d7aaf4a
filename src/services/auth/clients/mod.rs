/*
 * Responsibility
 * - capability traits every authentication mechanism implements
 * - `Client`: closed set {Direct, Indirect}; the pipeline only ever branches on
 *   this tag, never on a concrete mechanism
 */
use async_trait::async_trait;
use std::sync::Arc;

pub mod direct;
pub mod indirect;
pub mod registry;

pub use direct::{AnonymousClient, DirectBasicAuthClient, ParameterClient};
pub use indirect::{FormClient, IndirectBasicAuthClient, Protocol, ProtocolBackend, ProtocolClient};
pub use registry::ClientRegistry;

use crate::services::auth::action::HttpAction;
use crate::services::auth::context::WebContext;
use crate::services::auth::credentials::Credentials;
use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::profile::UserProfile;

/// Request parameter carrying the client name through a login round trip.
pub const CLIENT_NAME_PARAM: &str = "client_name";

#[async_trait]
pub trait CredentialsClient: Send + Sync {
    /// Unique, case-sensitive name.
    fn name(&self) -> &str;

    /// Extracts credentials from the request and validates them.
    ///
    /// - `NoCredentials`: nothing to authenticate with in this request
    /// - `InvalidCredentials`: material present but rejected
    async fn extract_credentials(&self, ctx: &WebContext) -> AuthResult<Credentials>;

    async fn build_profile(&self, credentials: Credentials) -> AuthResult<UserProfile> {
        credentials.into_user_profile().ok_or_else(|| {
            AuthError::profile_build(format!("{}: authenticator attached no profile", self.name()))
        })
    }
}

/// A client whose login needs a browser round trip through an identity provider.
#[async_trait]
pub trait IndirectClient: CredentialsClient {
    /// Where to send the browser to start the login.
    async fn redirection_action(&self, ctx: &WebContext) -> AuthResult<HttpAction>;

    /// `WWW-Authenticate` value sent with a 401 from the callback, if any.
    fn challenge(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Direct,
    Indirect,
}

#[derive(Clone)]
pub enum Client {
    Direct(Arc<dyn CredentialsClient>),
    Indirect(Arc<dyn IndirectClient>),
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

impl Client {
    pub fn direct(client: impl CredentialsClient + 'static) -> Self {
        Self::Direct(Arc::new(client))
    }

    pub fn indirect(client: impl IndirectClient + 'static) -> Self {
        Self::Indirect(Arc::new(client))
    }

    pub fn name(&self) -> &str {
        match self {
            Client::Direct(c) => c.name(),
            Client::Indirect(c) => c.name(),
        }
    }

    pub fn kind(&self) -> ClientKind {
        match self {
            Client::Direct(_) => ClientKind::Direct,
            Client::Indirect(_) => ClientKind::Indirect,
        }
    }

    pub fn as_indirect(&self) -> Option<&dyn IndirectClient> {
        match self {
            Client::Indirect(c) => Some(c.as_ref()),
            Client::Direct(_) => None,
        }
    }

    pub async fn extract_credentials(&self, ctx: &WebContext) -> AuthResult<Credentials> {
        match self {
            Client::Direct(c) => c.extract_credentials(ctx).await,
            Client::Indirect(c) => c.extract_credentials(ctx).await,
        }
    }

    pub async fn build_profile(&self, credentials: Credentials) -> AuthResult<UserProfile> {
        match self {
            Client::Direct(c) => c.build_profile(credentials).await,
            Client::Indirect(c) => c.build_profile(credentials).await,
        }
    }
}
