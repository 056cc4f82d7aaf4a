/*
 * Responsibility
 * - URL structure of the service
 * - pipeline endpoints are public; every page gets its own security rule
 */
use axum::{
    Router,
    routing::{MethodRouter, get},
};

use crate::middleware::auth::protect;
use crate::services::auth::RouteSecurityRule;
use crate::services::auth::factory::{ADMIN_AUTHORIZER, CUSTOM_AUTHORIZER};
use crate::state::AppState;

use crate::api::handlers::{
    health::health,
    pages::{authenticated_json, index, jwt, login_form, not_protected_index, protected_index},
    pipeline::{callback, force_login, logout},
};

/// One route behind its own rule. `clients` / `authorizers` are
/// comma-separated names; empty means none.
pub fn secured(
    state: &AppState,
    path: &str,
    route: MethodRouter<AppState>,
    clients: &str,
    authorizers: &str,
) -> Router<AppState> {
    let rule = RouteSecurityRule::new(path)
        .with_clients(clients)
        .with_authorizer(authorizers);
    protect(Router::new().route(path, route), state.clone(), rule)
}

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/callback", get(callback).post(callback))
        .route("/logout", get(logout).post(logout))
        .route("/forceLogin", get(force_login))
        .route("/loginForm.html", get(login_form))
        .route("/notprotected.html", get(not_protected_index));

    [
        secured(state, "/", get(index), "AnonymousClient", ""),
        secured(state, "/index.html", get(index), "AnonymousClient", ""),
        secured(state, "/jwt.html", get(jwt), "AnonymousClient", ""),
        secured(state, "/form/index.html", get(protected_index), "FormClient", ""),
        secured(state, "/form/index.html.json", get(authenticated_json), "FormClient", ""),
        secured(state, "/basicauth/index.html", get(protected_index), "IndirectBasicAuthClient", ""),
        secured(
            state,
            "/admin/index.html",
            get(protected_index),
            "IndirectBasicAuthClient",
            ADMIN_AUTHORIZER,
        ),
        secured(
            state,
            "/custom/index.html",
            get(protected_index),
            "FormClient",
            CUSTOM_AUTHORIZER,
        ),
        secured(state, "/protected/index.html", get(protected_index), "", ""),
        secured(
            state,
            "/dba/index.html",
            get(protected_index).post(protected_index),
            "DirectBasicAuthClient,ParameterClient",
            "",
        ),
        secured(state, "/rest-jwt/index.html", get(protected_index), "ParameterClient", ""),
    ]
    .into_iter()
    .fold(public, |router, page| router.merge(page))
}
