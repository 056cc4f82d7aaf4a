#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::routing::get;
use tower::ServiceExt;
use url::Url;

use authgate::api::handlers::pages::protected_index;
use authgate::api::secured;
use authgate::app::{build_router, build_state};
use authgate::config::Config;
use authgate::services::auth::clients::{Client, Protocol, ProtocolBackend, ProtocolClient};
use authgate::services::auth::{AuthError, AuthResult, UserProfile};

pub const GOOD_CODE: &str = "good-code";
pub const UNAUTHORIZED_PAGE: &str = "<h1>unauthorized</h1><br /><a href='/'>Home</a>";
pub const FORBIDDEN_PAGE: &str = "<h1>forbidden</h1><br /><a href='/'>Home</a>";
pub const INTERNAL_ERROR_PAGE: &str = "<h1>internal error</h1><br /><a href='/'>Home</a>";

/// Authorization-code provider that accepts exactly one code.
pub struct FakeOAuthBackend;

#[async_trait]
impl ProtocolBackend for FakeOAuthBackend {
    async fn redirection_url(&self, callback_url: &Url, state: Option<&str>) -> AuthResult<Url> {
        let mut url = Url::parse("https://provider.example.org/authorize").unwrap();
        url.query_pairs_mut()
            .append_pair("redirect_uri", callback_url.as_str());
        if let Some(state) = state {
            url.query_pairs_mut().append_pair("state", state);
        }
        Ok(url)
    }

    async fn validate(
        &self,
        response: &BTreeMap<String, String>,
        _callback_url: &Url,
    ) -> AuthResult<UserProfile> {
        match response.get("code").map(String::as_str) {
            Some(GOOD_CODE) => Ok(UserProfile::new("oauth-user").with_attribute("email", "u@example.org")),
            _ => Err(AuthError::invalid_credentials("code rejected")),
        }
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// `name=value` of the session cookie set by this response, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

/// Demo router plus test routes: an OAuth-protected page, a rule naming an
/// unknown client, mixed rules and a handler that renders its own 401.
pub async fn app() -> axum::Router {
    let config = Config::development().unwrap();
    let callback = config.callback_url.clone();

    let oauth = Client::indirect(ProtocolClient::new(
        "OAuthClient",
        Protocol::OAuth2,
        &callback,
        Arc::new(FakeOAuthBackend),
    ));
    let state = build_state(&config, vec![oauth]).await.unwrap();

    let extra = axum::Router::new()
        .merge(secured(&state, "/oauth/index.html", get(protected_index), "OAuthClient", ""))
        .merge(secured(&state, "/facebook/index.html", get(protected_index), "FacebookClient", ""))
        .merge(secured(
            &state,
            "/token-or-anon.html",
            get(protected_index),
            "ParameterClient,AnonymousClient",
            "",
        ))
        .merge(secured(
            &state,
            "/mixed/index.html",
            get(protected_index),
            "DirectBasicAuthClient,FormClient",
            "",
        ))
        .route(
            "/rendered-401",
            get(|| async { (StatusCode::UNAUTHORIZED, "rendered by the handler") }),
        );

    build_router(state, &config, extra)
}

pub async fn send(app: &axum::Router, req: Request<Body>) -> Reply {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get_with(app: &axum::Router, uri: &str, cookie: Option<&str>) -> Reply {
    let mut req = Request::get(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    send(app, req.body(Body::empty()).unwrap()).await
}

pub async fn post_form(app: &axum::Router, uri: &str, form: &str, cookie: &str) -> Reply {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, cookie)
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, req).await
}

/// Logs in through the form client and returns the session cookie issued
/// by the callback.
pub async fn form_login(app: &axum::Router, username: &str) -> String {
    let start = get_with(app, "/form/index.html", None).await;
    assert_eq!(start.status, StatusCode::FOUND);
    let cookie = start.session_cookie().expect("session cookie");

    let done = post_form(
        app,
        "/callback?client_name=FormClient",
        &format!("username={username}&password={username}"),
        &cookie,
    )
    .await;
    assert_eq!(done.status, StatusCode::FOUND);
    assert_eq!(done.location(), "/form/index.html");
    done.session_cookie().expect("renewed session cookie")
}
