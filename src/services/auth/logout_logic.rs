use axum::http::HeaderValue;

use crate::services::auth::action::HttpAction;
use crate::services::auth::context::WebContext;
use crate::services::auth::security_config::SecurityConfig;

/// Request parameter naming where to go after logout.
pub const LOGOUT_URL_PARAM: &str = "url";

/// Removes every profile from the session, then redirects to `url` when the
/// allow-list admits it, or to the default logout url.
pub async fn perform(config: &SecurityConfig, ctx: &WebContext) -> HttpAction {
    if let Err(err) = ctx.session().clear_profiles().await {
        tracing::error!(error = %err, "logout failed");
        return HttpAction::InternalError;
    }

    let target = match ctx.request_param(LOGOUT_URL_PARAM) {
        Some(url) if is_allowed(config, url) => url.to_string(),
        Some(url) => {
            tracing::warn!(url, "logout target rejected");
            config.default_logout_url.clone()
        }
        None => config.default_logout_url.clone(),
    };

    tracing::debug!(session = %ctx.session().id(), "logged out");
    HttpAction::redirect(target)
}

// a configured pattern may still admit something that is not a valid
// Location value
fn is_allowed(config: &SecurityConfig, url: &str) -> bool {
    config.logout_url_pattern.is_match(url) && HeaderValue::from_str(url).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::authorizer::AuthorizerRegistry;
    use crate::services::auth::clients::ClientRegistry;
    use crate::services::auth::profile::UserProfile;
    use crate::services::session::{MemorySessionStore, Session, SharedSessionStore};
    use axum::http::{HeaderMap, Method};
    use std::sync::Arc;

    fn config() -> SecurityConfig {
        SecurityConfig::new(ClientRegistry::new(), AuthorizerRegistry::new()).unwrap()
    }

    async fn logged_in() -> Session {
        let store: SharedSessionStore = Arc::new(MemorySessionStore::default());
        let session = Session::new("s1", store);
        let mut form = UserProfile::new("jle");
        form.client_name = "FormClient".to_string();
        session.save_profile(form).await.unwrap();
        session.save_profile(UserProfile::new("other")).await.unwrap();
        session
    }

    fn ctx(uri: &str, session: &Session) -> WebContext {
        WebContext::new(Method::GET, uri.parse().unwrap(), HeaderMap::new(), session.clone())
    }

    #[tokio::test]
    async fn clears_every_profile_and_follows_an_allowed_url() {
        let s = logged_in().await;

        let action = perform(&config(), &ctx("/logout?url=/?forcepostlogouturl", &s)).await;

        assert_eq!(action, HttpAction::redirect("/?forcepostlogouturl"));
        assert!(s.profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_or_missing_url_falls_back_to_the_default() {
        let s = logged_in().await;

        for uri in [
            "/logout",
            "/logout?url=//evil.example.org",
            "/logout?url=https://evil.example.org",
            "/logout?url=/%5Cevil.example.org",
            "/logout?url=/%09/evil.example.org",
            "/logout?url=/a%0D",
        ] {
            let action = perform(&config(), &ctx(uri, &s)).await;
            assert_eq!(action, HttpAction::redirect("/?defaulturlafterlogout"), "{uri}");
        }
    }

    #[tokio::test]
    async fn permissive_pattern_still_refuses_invalid_header_values() {
        let config = config().with_logout_url_pattern("^/.*$").unwrap();
        let s = logged_in().await;

        let action = perform(&config, &ctx("/logout?url=/a%0Db", &s)).await;

        assert_eq!(action, HttpAction::redirect("/?defaulturlafterlogout"));
    }
}
