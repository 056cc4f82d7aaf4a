/*
 * Responsibility
 * - demo pages behind the security middleware: index, protected areas,
 *   JSON identity, login form, JWT generation
 */
use axum::{
    Extension, Json,
    extract::State,
    response::{Html, IntoResponse},
};
use serde_json::json;

use crate::api::extractors::ProfilesExtractor;
use crate::error::AppError;
use crate::services::auth::UserProfile;
use crate::services::auth::clients::indirect::callback_url_for;
use crate::services::session::Session;
use crate::state::AppState;

const FORM_CLIENT: &str = "FormClient";

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn render_profiles(profiles: &[UserProfile]) -> String {
    let raw = serde_json::to_string(profiles).unwrap_or_else(|_| "[]".to_string());
    escape(&raw)
}

pub async fn index(
    Extension(session): Extension<Session>,
    ProfilesExtractor(current): ProfilesExtractor,
) -> Result<Html<String>, AppError> {
    let stored = session.profiles().await?.into_vec();
    let profiles = if stored.is_empty() {
        current.profiles
    } else {
        stored
    };

    let mut page = String::from("<h1>index</h1>");
    for (href, label) in [
        ("form/index.html", "Protected url by form authentication: form/index.html</a> (use login = pwd)"),
        ("basicauth/index.html", "Protected url by indirect basic auth: basicauth/index.html</a> (use login = pwd)"),
        ("admin/index.html", "Protected url with ROLE_ADMIN: admin/index.html</a> (indirect basic auth users get ROLE_ADMIN)"),
        ("custom/index.html", "Protected url with custom authorizer (id must start with 'jle'): custom/index.html</a>"),
        ("protected/index.html", "Protected url: protected/index.html</a> (won't start any login process)"),
        ("notprotected.html", "Not protected page: notprotected.html</a>"),
    ] {
        page.push_str(&format!("<a href='{href}'>{label}<br />"));
    }
    page.push_str("<br /><a href='jwt.html'>Generate a JWT token</a> (after being authenticated)<br />");
    page.push_str(
        "<a href='/dba/index.html'>Protected url by DirectBasicAuthClient: /dba/index.html</a> \
         (send the <em>Authorization</em> header with value: <em>Basic amxlbGV1OmpsZWxldQ==</em>) \
         or by ParameterClient (with request parameter: token=<em>jwt_generated_token</em>)<br />",
    );
    page.push_str(
        "<a href='/rest-jwt/index.html'>Protected url by ParameterClient: /rest-jwt/index.html</a> \
         (with request parameter: token=<em>jwt_generated_token</em>)<br />",
    );
    page.push_str("<br /><a href='/forceLogin?client_name=FormClient'>Force form login</a> (even if already authenticated)<br />");
    page.push_str("<br /><a href='/logout?url=/?forcepostlogouturl'>logout</a>");
    page.push_str("<br /><br />profiles: ");
    page.push_str(&render_profiles(&profiles));

    Ok(Html(page))
}

pub async fn protected_index(ProfilesExtractor(current): ProfilesExtractor) -> Html<String> {
    Html(format!(
        "<h1>protected area</h1><a href=\"..\">Back</a><br /><br /><br />profiles: {}<br />",
        render_profiles(&current.profiles)
    ))
}

pub async fn not_protected_index() -> Html<&'static str> {
    Html("<h1>not protected area</h1><a href=\"..\">Back</a><br />")
}

pub async fn authenticated_json(ProfilesExtractor(current): ProfilesExtractor) -> impl IntoResponse {
    let username = current.primary().map(|p| p.id.clone()).unwrap_or_default();
    Json(json!({ "username": username }))
}

pub async fn login_form(State(state): State<AppState>) -> Html<String> {
    let action = match &state.security.callback_url {
        Some(url) => callback_url_for(url, FORM_CLIENT).to_string(),
        None => format!("/callback?client_name={FORM_CLIENT}"),
    };

    Html(format!(
        "<html><body>\
         <form action=\"{}\" method=\"POST\">\
         <input type=\"text\" name=\"username\" value=\"\" />\
         <p />\
         <input type=\"password\" name=\"password\" value=\"\" />\
         <p />\
         <input type=\"submit\" name=\"submit\" value=\"Submit\" />\
         </form>\
         </body></html>",
        escape(&action)
    ))
}

/// Signs the first authenticated profile of the session; empty token when
/// the caller is anonymous.
pub async fn jwt(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    let profiles = session.profiles().await?;
    let token = match profiles.iter().find(|p| !p.is_anonymous()) {
        Some(profile) => state.jwt.generate(profile)?,
        None => String::new(),
    };

    Ok(Html(format!(
        "<h1>Generate JWT token</h1><a href='..'>Back</a><br /><br /><br />token: {token}"
    )))
}
