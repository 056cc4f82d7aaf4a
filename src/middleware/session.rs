//! Cookie-backed session handle.
//!
//! Responsibility:
//! - Read the session id from the session cookie, or mint a new one
//! - Put a `Session` (id + shared store) into request extensions
//! - Send `Set-Cookie` only when this request created or renewed the session

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
};
use crate::services::session::{Session, new_session_id};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    // `Secure` attribute; on in production
    pub secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    fn header_value(&self, session_id: &str) -> String {
        let mut value = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", self.name, session_id);
        if self.secure {
            value.push_str("; Secure");
        }
        value
    }
}

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, session_middleware))
}

async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let existing = cookie_value(req.headers(), &state.session_cookie.name)
        .filter(|id| is_session_id(id));

    let (id, created) = match existing {
        Some(id) => (id, false),
        None => (new_session_id(), true),
    };

    let session = Session::new(id.clone(), state.sessions.clone());
    req.extensions_mut().insert(session.clone());

    let mut res = next.run(req).await;

    // renewed on login
    let current = session.id();
    if created || current != id {
        match HeaderValue::from_str(&state.session_cookie.header_value(&current)) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(err) => tracing::error!(error = ?err, "session cookie not set"),
        }
    }
    res
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

// ids are minted as simple (32 hex digit) uuids; anything else gets a new session
fn is_session_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit())
}
