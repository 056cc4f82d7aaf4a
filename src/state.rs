/*
 * Responsibility
 * - shared context handed to every handler and middleware (AppState)
 * - Clone is cheap: everything heavy sits behind Arc
 */
use std::sync::Arc;

use crate::middleware::session::SessionCookie;
use crate::services::auth::SecurityConfig;
use crate::services::auth::jwt::JwtGenerator;
use crate::services::session::SharedSessionStore;

#[derive(Clone)]
pub struct AppState {
    pub security: Arc<SecurityConfig>,
    pub sessions: SharedSessionStore,
    pub jwt: Arc<JwtGenerator>,
    pub session_cookie: SessionCookie,
}

impl AppState {
    pub fn new(
        security: Arc<SecurityConfig>,
        sessions: SharedSessionStore,
        jwt: Arc<JwtGenerator>,
        session_cookie: SessionCookie,
    ) -> Self {
        Self {
            security,
            sessions,
            jwt,
            session_cookie,
        }
    }
}
