//! Security handler as route middleware: authenticate, authorize, then either
//! call the wrapped handler or answer with the pipeline's action.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::extractors::AuthenticatedProfiles;
use crate::services::auth::{AuthOutcome, RouteSecurityRule, WebContext, security_logic};
use crate::state::AppState;

#[derive(Clone)]
struct Guard {
    state: AppState,
    rule: Arc<RouteSecurityRule>,
}

/// Protects every route of `router` with `rule`.
///
/// ```ignore
/// let admin = Router::new().route("/admin/index.html", get(pages::protected));
/// let admin = middleware::auth::protect(
///     admin,
///     state.clone(),
///     RouteSecurityRule::new("/admin/index.html")
///         .with_clients("IndirectBasicAuthClient")
///         .with_authorizer("admin"),
/// );
/// ```
pub fn protect(
    router: Router<AppState>,
    state: AppState,
    rule: RouteSecurityRule,
) -> Router<AppState> {
    let unknown = state.security.unknown_names(&rule);
    if !unknown.is_empty() {
        tracing::warn!(route = rule.pattern(), ?unknown, "rule names unknown clients or authorizers");
    }

    let guard = Guard {
        state,
        rule: Arc::new(rule),
    };
    // route_layer: unmatched paths stay 404 instead of going through the check
    router.route_layer(middleware::from_fn_with_state(guard, security_middleware))
}

async fn security_middleware(
    State(guard): State<Guard>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (ctx, mut req) = match WebContext::from_request(req).await {
        Ok(split) => split,
        Err(err) => {
            tracing::error!(route = guard.rule.pattern(), error = %err, "request rejected");
            return err.to_action().into_response();
        }
    };

    match security_logic::perform(&guard.state.security, &ctx, &guard.rule).await {
        AuthOutcome::Continue(profiles) => {
            req.extensions_mut()
                .insert(AuthenticatedProfiles::new(profiles));
            next.run(req).await
        }
        AuthOutcome::Halt(action) => action.into_response(),
    }
}
