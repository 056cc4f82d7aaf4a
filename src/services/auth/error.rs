use thiserror::Error;

use crate::services::auth::action::HttpAction;
use crate::services::session::SessionError;

pub type AuthResult<T> = Result<T, AuthError>;

/// Failures raised while authenticating or authorizing a request.
///
/// Every variant is caught at the handler boundary and mapped to an
/// [`HttpAction`]; none of them reaches the transport as a raw fault.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("client not found: {0}")]
    ClientNotFound(String),

    #[error("authorizer not found: {0}")]
    AuthorizerNotFound(String),

    #[error("missing client_name parameter")]
    MissingClientName,

    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    // Expected: the client found nothing to authenticate with.
    #[error("no credentials")]
    NoCredentials,

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("profile build failed: {0}")]
    ProfileBuild(String),

    #[error("authorization denied")]
    AuthorizationDenied,

    // A protocol collaborator (token exchange, ticket validation, ...) failed.
    #[error("identity provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    pub fn invalid_credentials(reason: impl Into<String>) -> Self {
        Self::InvalidCredentials(reason.into())
    }

    pub fn profile_build(reason: impl Into<String>) -> Self {
        Self::ProfileBuild(reason.into())
    }

    /// Credential failures may fall through to the next client of a rule.
    pub fn is_credentials_failure(&self) -> bool {
        matches!(self, Self::NoCredentials | Self::InvalidCredentials(_))
    }

    pub fn to_action(&self) -> HttpAction {
        match self {
            AuthError::NoCredentials | AuthError::InvalidCredentials(_) => {
                HttpAction::unauthorized()
            }
            AuthError::AuthorizationDenied => HttpAction::Forbidden,
            AuthError::ClientNotFound(_)
            | AuthError::AuthorizerNotFound(_)
            | AuthError::MissingClientName
            | AuthError::DuplicateName { .. }
            | AuthError::Configuration(_)
            | AuthError::ProfileBuild(_)
            | AuthError::Provider(_)
            | AuthError::Session(_) => HttpAction::InternalError,
        }
    }
}
