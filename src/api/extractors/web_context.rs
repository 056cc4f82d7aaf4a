use axum::{
    body::Body,
    extract::FromRequest,
    http::Request,
    response::{IntoResponse, Response},
};

use crate::services::auth::WebContext;
use crate::state::AppState;

/// The request as the pipeline sees it (parameters, headers, session).
/// Consumes the body, so it must be the last extractor of a handler.
pub struct RequestContext(pub WebContext);

impl FromRequest<AppState> for RequestContext {
    type Rejection = Response;

    async fn from_request(req: Request<Body>, _state: &AppState) -> Result<Self, Self::Rejection> {
        match WebContext::from_request(req).await {
            Ok((ctx, _)) => Ok(RequestContext(ctx)),
            Err(err) => {
                tracing::error!(error = %err, "request context unavailable");
                Err(err.to_action().into_response())
            }
        }
    }
}
