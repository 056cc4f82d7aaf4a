/*
 * Responsibility
 * - WebContext: the request view handed to clients (method, uri, headers,
 *   query + form parameters) together with the caller's Session
 * - building it from an axum request without losing the body for the handler
 */
use axum::{
    body::{self, Body},
    http::{HeaderMap, Method, Request, Uri, header},
};
use std::collections::{BTreeMap, HashMap};

use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::session::Session;

/// Largest form body buffered to read credentials from it.
pub const MAX_FORM_BODY_BYTES: usize = 64 * 1024;

const AJAX_HEADER: &str = "x-requested-with";
const AJAX_HEADER_VALUE: &str = "XMLHttpRequest";

#[derive(Debug, Clone)]
pub struct WebContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
    session: Session,
}

impl WebContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, session: Session) -> Self {
        let query = uri.query().map(parse_params).unwrap_or_default();
        Self {
            method,
            uri,
            headers,
            query,
            form: HashMap::new(),
            session,
        }
    }

    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        self.form = parse_params(&String::from_utf8_lossy(body));
        self
    }

    /// Splits `req` into a context and an equivalent request for the next
    /// handler. Urlencoded POST bodies are buffered so their parameters are
    /// visible to credential extraction.
    ///
    /// The [`Session`] must already be in the request extensions (see
    /// `middleware::session`).
    pub async fn from_request(req: Request<Body>) -> AuthResult<(Self, Request<Body>)> {
        let session = req.extensions().get::<Session>().cloned().ok_or_else(|| {
            AuthError::Configuration("session middleware is not installed".to_string())
        })?;

        let is_form = req.method() == Method::POST
            && req
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        let ctx = Self::new(
            req.method().clone(),
            req.uri().clone(),
            req.headers().clone(),
            session,
        );
        if !is_form {
            return Ok((ctx, req));
        }

        let (parts, body) = req.into_parts();
        let bytes = body::to_bytes(body, MAX_FORM_BODY_BYTES)
            .await
            .map_err(|e| AuthError::invalid_credentials(format!("unreadable form body: {e}")))?;
        let ctx = ctx.with_form_body(&bytes);

        Ok((ctx, Request::from_parts(parts, Body::from(bytes))))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn form_param(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    /// Query parameter first, then form parameter.
    pub fn request_param(&self, name: &str) -> Option<&str> {
        self.query_param(name).or_else(|| self.form_param(name))
    }

    /// Every query and form parameter; form values win on duplicate names.
    pub fn request_params(&self) -> BTreeMap<String, String> {
        self.query
            .iter()
            .chain(self.form.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Path and query of the current request, used as post-login target.
    pub fn requested_url(&self) -> String {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string())
    }

    pub fn is_ajax(&self) -> bool {
        self.headers
            .get(AJAX_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case(AJAX_HEADER_VALUE))
    }
}

// First occurrence wins for repeated keys.
fn parse_params(raw: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (k, v) in url::form_urlencoded::parse(raw.as_bytes()) {
        params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    params
}
