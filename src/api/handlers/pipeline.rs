/*
 * Responsibility
 * - the three pipeline endpoints: /callback, /logout, /forceLogin
 * - thin adapters: all decisions live in services::auth
 */
use axum::extract::State;

use crate::api::extractors::RequestContext;
use crate::services::auth::{HttpAction, callback_logic, logout_logic};
use crate::state::AppState;

/// GET|POST /callback?client_name=<name>
pub async fn callback(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
) -> HttpAction {
    callback_logic::perform(&state.security, &ctx).await
}

/// GET|POST /logout[?url=<target>]
pub async fn logout(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
) -> HttpAction {
    logout_logic::perform(&state.security, &ctx).await
}

/// GET /forceLogin?client_name=<indirect client>
pub async fn force_login(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
) -> HttpAction {
    callback_logic::force_login(&state.security, &ctx).await
}
