/*
 * Responsibility
 * - everything the pipeline needs, built once at startup and shared behind Arc
 * - clients, authorizers, profile post-processing and the pipeline URLs
 */
use regex::Regex;
use url::Url;

use crate::services::auth::authorizer::AuthorizerRegistry;
use crate::services::auth::clients::ClientRegistry;
use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::profile::ProfileBuilder;
use crate::services::auth::rule::RouteSecurityRule;

pub const DEFAULT_SUCCESS_URL: &str = "/";
pub const DEFAULT_LOGOUT_URL: &str = "/?defaulturlafterlogout";
/// Same-origin absolute paths only: `/x` is allowed, `//host/x` is not.
/// Backslashes and control characters are refused anywhere, since browsers
/// read `/\host` and `/<TAB>/host` as `//host`.
pub const DEFAULT_LOGOUT_URL_PATTERN: &str = r"^/([^/\\[:cntrl:]\s][^\\[:cntrl:]]*)?$";

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub clients: ClientRegistry,
    pub authorizers: AuthorizerRegistry,
    pub profile_builder: ProfileBuilder,
    // base url indirect clients come back to; client_name is appended per client
    pub callback_url: Option<Url>,
    pub default_success_url: String,
    pub default_logout_url: String,
    pub logout_url_pattern: Regex,
}

impl SecurityConfig {
    pub fn new(clients: ClientRegistry, authorizers: AuthorizerRegistry) -> AuthResult<Self> {
        Ok(Self {
            clients,
            authorizers,
            profile_builder: ProfileBuilder::new(),
            callback_url: None,
            default_success_url: DEFAULT_SUCCESS_URL.to_string(),
            default_logout_url: DEFAULT_LOGOUT_URL.to_string(),
            logout_url_pattern: compile_pattern(DEFAULT_LOGOUT_URL_PATTERN)?,
        })
    }

    pub fn with_profile_builder(mut self, profile_builder: ProfileBuilder) -> Self {
        self.profile_builder = profile_builder;
        self
    }

    pub fn with_callback_url(mut self, url: Url) -> Self {
        self.callback_url = Some(url);
        self
    }

    pub fn with_default_success_url(mut self, url: impl Into<String>) -> Self {
        self.default_success_url = url.into();
        self
    }

    pub fn with_default_logout_url(mut self, url: impl Into<String>) -> Self {
        self.default_logout_url = url.into();
        self
    }

    pub fn with_logout_url_pattern(mut self, pattern: &str) -> AuthResult<Self> {
        self.logout_url_pattern = compile_pattern(pattern)?;
        Ok(self)
    }

    /// Names in `rule` that resolve to nothing. Unknown names still fail at
    /// request time (500); this is for reporting at startup.
    pub fn unknown_names(&self, rule: &RouteSecurityRule) -> Vec<String> {
        let clients = rule
            .clients()
            .iter()
            .filter(|name| self.clients.resolve(name).is_err());
        let authorizers = rule
            .authorizers()
            .iter()
            .filter(|name| !self.authorizers.contains(name));
        clients.chain(authorizers).cloned().collect()
    }
}

fn compile_pattern(pattern: &str) -> AuthResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| AuthError::Configuration(format!("logout url pattern {pattern:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::authorizer::RequireAnyRole;
    use crate::services::auth::clients::{AnonymousClient, Client};

    fn config() -> SecurityConfig {
        let mut clients = ClientRegistry::new();
        clients.register(Client::direct(AnonymousClient::new())).unwrap();
        let mut authorizers = AuthorizerRegistry::new();
        authorizers
            .register("admin", RequireAnyRole::new(["ROLE_ADMIN"]))
            .unwrap();
        SecurityConfig::new(clients, authorizers).unwrap()
    }

    #[test]
    fn default_logout_pattern_only_admits_local_paths() {
        let pattern = &config().logout_url_pattern;

        assert!(pattern.is_match("/"));
        assert!(pattern.is_match("/?forcepostlogouturl"));
        assert!(!pattern.is_match("//evil.example.org"));
        assert!(!pattern.is_match("https://evil.example.org/"));
        assert!(!pattern.is_match("/\\evil.example.org"));
        assert!(!pattern.is_match("/\t/evil.example.org"));
        assert!(!pattern.is_match("/ /evil.example.org"));
        assert!(!pattern.is_match("/a\r"));
        assert!(!pattern.is_match("/a/b\\c"));
        assert!(pattern.is_match("/a/b?c=d e"));
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let res = config().with_logout_url_pattern("([");
        assert!(matches!(res, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn reports_unknown_rule_names() {
        let rule = RouteSecurityRule::new("/x")
            .with_clients("AnonymousClient,FacebookClient")
            .with_authorizer("admin,nope");

        assert_eq!(config().unknown_names(&rule), ["FacebookClient", "nope"]);
    }
}
