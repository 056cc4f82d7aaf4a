use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::services::auth::profile::UserProfile;

/// HTTP-level outcome the pipeline wants the transport to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpAction {
    Redirect { location: String },
    // `challenge` becomes the `WWW-Authenticate` header when present.
    Unauthorized { challenge: Option<String> },
    Forbidden,
    InternalError,
}

impl HttpAction {
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized { challenge: None }
    }

    pub fn challenge(challenge: impl Into<String>) -> Self {
        Self::Unauthorized {
            challenge: Some(challenge.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HttpAction::Redirect { .. } => StatusCode::FOUND,
            HttpAction::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            HttpAction::Forbidden => StatusCode::FORBIDDEN,
            HttpAction::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpAction {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            HttpAction::Redirect { location } => {
                (status, [(header::LOCATION, location)]).into_response()
            }
            HttpAction::Unauthorized {
                challenge: Some(challenge),
            } => (status, [(header::WWW_AUTHENTICATE, challenge)]).into_response(),
            // Bodies for 401/403/500 are rendered by the error pages middleware.
            _ => status.into_response(),
        }
    }
}

/// Result of running the security handler for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Continue(Vec<UserProfile>),
    Halt(HttpAction),
}
