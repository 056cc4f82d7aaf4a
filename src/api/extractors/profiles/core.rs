use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::state::AppState;

use super::AuthenticatedProfiles;

/// Hands the profiles stored by the security middleware to a handler.
/// Missing profiles mean the route is not protected: 401.
pub struct ProfilesExtractor(pub AuthenticatedProfiles);

impl FromRequestParts<AppState> for ProfilesExtractor
where
    AppState: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedProfiles>()
            .cloned()
            .map(ProfilesExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
