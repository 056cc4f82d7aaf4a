//! Indirect clients: the browser is redirected away and comes back to the
//! callback endpoint with the material to validate.
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::services::auth::action::HttpAction;
use crate::services::auth::authenticator::SharedAuthenticator;
use crate::services::auth::clients::direct::basic_auth_credentials;
use crate::services::auth::clients::{CLIENT_NAME_PARAM, CredentialsClient, IndirectClient};
use crate::services::auth::context::WebContext;
use crate::services::auth::credentials::Credentials;
use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::profile::UserProfile;

/// `callback_url` with the `client_name` discriminator appended.
pub fn callback_url_for(callback_url: &Url, client_name: &str) -> Url {
    let mut url = callback_url.clone();
    url.query_pairs_mut()
        .append_pair(CLIENT_NAME_PARAM, client_name);
    url
}

/// Login form hosted by the application; the form posts to the callback.
#[derive(Clone)]
pub struct FormClient {
    name: String,
    login_url: String,
    username_param: String,
    password_param: String,
    authenticator: SharedAuthenticator,
}

impl std::fmt::Debug for FormClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormClient")
            .field("name", &self.name)
            .field("login_url", &self.login_url)
            .finish()
    }
}

impl FormClient {
    pub fn new(login_url: impl Into<String>, authenticator: SharedAuthenticator) -> Self {
        Self {
            name: "FormClient".to_string(),
            login_url: login_url.into(),
            username_param: "username".to_string(),
            password_param: "password".to_string(),
            authenticator,
        }
    }

}

#[async_trait]
impl CredentialsClient for FormClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_credentials(&self, ctx: &WebContext) -> AuthResult<Credentials> {
        let username = ctx.request_param(&self.username_param);
        let password = ctx.request_param(&self.password_param);
        let (Some(username), Some(password)) = (username, password) else {
            return Err(AuthError::NoCredentials);
        };

        self.authenticator
            .validate(Credentials::username_password(username, password))
            .await
    }
}

#[async_trait]
impl IndirectClient for FormClient {
    async fn redirection_action(&self, _ctx: &WebContext) -> AuthResult<HttpAction> {
        Ok(HttpAction::redirect(self.login_url.clone()))
    }
}

/// Basic authentication negotiated on the callback endpoint: the browser is
/// sent to the callback, which answers 401 + `WWW-Authenticate` until valid
/// credentials arrive.
#[derive(Clone)]
pub struct IndirectBasicAuthClient {
    name: String,
    realm: String,
    callback_url: Url,
    authenticator: SharedAuthenticator,
}

impl std::fmt::Debug for IndirectBasicAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndirectBasicAuthClient")
            .field("name", &self.name)
            .field("realm", &self.realm)
            .finish()
    }
}

impl IndirectBasicAuthClient {
    pub fn new(callback_url: &Url, authenticator: SharedAuthenticator) -> Self {
        let name = "IndirectBasicAuthClient".to_string();
        Self {
            callback_url: callback_url_for(callback_url, &name),
            name,
            realm: "authentication required".to_string(),
            authenticator,
        }
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }
}

#[async_trait]
impl CredentialsClient for IndirectBasicAuthClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_credentials(&self, ctx: &WebContext) -> AuthResult<Credentials> {
        let credentials = basic_auth_credentials(ctx)?;
        self.authenticator.validate(credentials).await
    }
}

#[async_trait]
impl IndirectClient for IndirectBasicAuthClient {
    async fn redirection_action(&self, _ctx: &WebContext) -> AuthResult<HttpAction> {
        Ok(HttpAction::redirect(self.callback_url.to_string()))
    }

    fn challenge(&self) -> Option<String> {
        Some(format!("Basic realm=\"{}\"", self.realm))
    }
}

/// Identity protocols driven through a [`ProtocolBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    OAuth2,
    Oidc,
    Saml2,
    Cas,
}

impl Protocol {
    /// Callback parameter holding the material to validate.
    pub fn credential_param(&self) -> &'static str {
        match self {
            Protocol::OAuth2 | Protocol::Oidc => "code",
            Protocol::Saml2 => "SAMLResponse",
            Protocol::Cas => "ticket",
        }
    }

    /// Parameter echoing the round-trip state, for protocols that have one.
    pub fn state_param(&self) -> Option<&'static str> {
        match self {
            Protocol::OAuth2 | Protocol::Oidc => Some("state"),
            Protocol::Saml2 => Some("RelayState"),
            Protocol::Cas => None,
        }
    }

    /// Parameter a provider uses to report a refused/failed login.
    pub fn error_param(&self) -> Option<&'static str> {
        match self {
            Protocol::OAuth2 | Protocol::Oidc => Some("error"),
            Protocol::Saml2 | Protocol::Cas => None,
        }
    }
}

/// Seam where the OAuth2 / OIDC / SAML2 / CAS wire protocols plug in.
///
/// Implementations own the provider endpoints, secrets and signature checks;
/// network failures and timeouts surface as `AuthError::Provider`.
#[async_trait]
pub trait ProtocolBackend: Send + Sync {
    /// Provider url starting the login (authorization url, AuthnRequest
    /// redirect, CAS login url, ...).
    async fn redirection_url(&self, callback_url: &Url, state: Option<&str>) -> AuthResult<Url>;

    /// Finishes the protocol (code exchange, assertion or ticket validation)
    /// and returns the user's profile. Rejected material is `InvalidCredentials`.
    async fn validate(
        &self,
        response: &BTreeMap<String, String>,
        callback_url: &Url,
    ) -> AuthResult<UserProfile>;
}

#[derive(Clone)]
pub struct ProtocolClient {
    name: String,
    protocol: Protocol,
    callback_url: Url,
    backend: Arc<dyn ProtocolBackend>,
}

impl std::fmt::Debug for ProtocolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolClient")
            .field("name", &self.name)
            .field("protocol", &self.protocol)
            .field("callback_url", &self.callback_url.as_str())
            .finish()
    }
}

impl ProtocolClient {
    pub fn new(
        name: impl Into<String>,
        protocol: Protocol,
        callback_url: &Url,
        backend: Arc<dyn ProtocolBackend>,
    ) -> Self {
        let name = name.into();
        Self {
            callback_url: callback_url_for(callback_url, &name),
            name,
            protocol,
            backend,
        }
    }

    fn state_key(&self) -> String {
        format!("authgate.state.{}", self.name)
    }

    async fn check_state(
        &self,
        ctx: &WebContext,
        params: &BTreeMap<String, String>,
    ) -> AuthResult<()> {
        let Some(state_param) = self.protocol.state_param() else {
            return Ok(());
        };

        let session = ctx.session();
        let expected: Option<String> = session.get(&self.state_key()).await?;
        // single use
        session.remove(&self.state_key()).await?;

        match (expected, params.get(state_param)) {
            (Some(expected), Some(received)) if &expected == received => Ok(()),
            _ => Err(AuthError::invalid_credentials(format!(
                "{state_param} does not match the value issued for this session"
            ))),
        }
    }
}

#[async_trait]
impl CredentialsClient for ProtocolClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_credentials(&self, ctx: &WebContext) -> AuthResult<Credentials> {
        let params = ctx.request_params();

        if !params.contains_key(self.protocol.credential_param()) {
            let provider_error = self.protocol.error_param().and_then(|p| params.get(p));
            return Err(match provider_error {
                Some(error) => {
                    AuthError::invalid_credentials(format!("provider returned error: {error}"))
                }
                None => AuthError::NoCredentials,
            });
        }

        self.check_state(ctx, &params).await?;

        let profile = self.backend.validate(&params, &self.callback_url).await?;
        Ok(Credentials::provider_response(params).with_user_profile(profile))
    }
}

#[async_trait]
impl IndirectClient for ProtocolClient {
    async fn redirection_action(&self, ctx: &WebContext) -> AuthResult<HttpAction> {
        let state = match self.protocol.state_param() {
            Some(_) => {
                let state = Uuid::new_v4().simple().to_string();
                ctx.session().put(&self.state_key(), &state).await?;
                Some(state)
            }
            None => None,
        };

        let url = self
            .backend
            .redirection_url(&self.callback_url, state.as_deref())
            .await?;
        Ok(HttpAction::redirect(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::authenticator::SimpleTestUsernamePasswordAuthenticator;
    use crate::services::session::{MemorySessionStore, Session, SharedSessionStore};
    use axum::http::{HeaderMap, Method};

    struct CasLike;

    #[async_trait]
    impl ProtocolBackend for CasLike {
        async fn redirection_url(&self, callback_url: &Url, _state: Option<&str>) -> AuthResult<Url> {
            let mut url = Url::parse("https://cas.example.org/login").unwrap();
            url.query_pairs_mut().append_pair("service", callback_url.as_str());
            Ok(url)
        }

        async fn validate(
            &self,
            response: &BTreeMap<String, String>,
            _callback_url: &Url,
        ) -> AuthResult<UserProfile> {
            match response.get("ticket").map(String::as_str) {
                Some("ST-good") => Ok(UserProfile::new("casuser")),
                _ => Err(AuthError::invalid_credentials("ticket rejected")),
            }
        }
    }

    fn callback() -> Url {
        Url::parse("http://localhost:8080/callback").unwrap()
    }

    fn ctx(uri: &str, session: &Session) -> WebContext {
        WebContext::new(Method::GET, uri.parse().unwrap(), HeaderMap::new(), session.clone())
    }

    fn session() -> Session {
        let store: SharedSessionStore = Arc::new(MemorySessionStore::default());
        Session::new("s1", store)
    }

    #[test]
    fn callback_url_carries_the_client_name() {
        let url = callback_url_for(&callback(), "FormClient");
        assert_eq!(url.as_str(), "http://localhost:8080/callback?client_name=FormClient");
    }

    #[tokio::test]
    async fn form_client_redirects_to_the_login_page() {
        let client = FormClient::new(
            "http://localhost:8080/loginForm.html",
            Arc::new(SimpleTestUsernamePasswordAuthenticator::new()),
        );
        let action = client.redirection_action(&ctx("/form/index.html", &session())).await;

        assert_eq!(
            action.unwrap(),
            HttpAction::redirect("http://localhost:8080/loginForm.html")
        );
    }

    #[tokio::test]
    async fn indirect_basic_auth_challenges_from_the_callback() {
        let client = IndirectBasicAuthClient::new(
            &callback(),
            Arc::new(SimpleTestUsernamePasswordAuthenticator::new()),
        );
        let s = session();

        let action = client.redirection_action(&ctx("/basicauth/index.html", &s)).await;
        assert_eq!(
            action.unwrap(),
            HttpAction::redirect("http://localhost:8080/callback?client_name=IndirectBasicAuthClient")
        );
        assert_eq!(
            client.challenge().as_deref(),
            Some("Basic realm=\"authentication required\"")
        );
        assert!(matches!(
            client
                .extract_credentials(&ctx("/callback?client_name=IndirectBasicAuthClient", &s))
                .await,
            Err(AuthError::NoCredentials)
        ));
    }

    #[tokio::test]
    async fn protocol_without_state_validates_the_ticket() {
        let client = ProtocolClient::new("CasClient", Protocol::Cas, &callback(), Arc::new(CasLike));
        let s = session();

        let action = client.redirection_action(&ctx("/cas/index.html", &s)).await.unwrap();
        let HttpAction::Redirect { location } = action else {
            panic!("expected a redirect");
        };
        assert!(location.starts_with("https://cas.example.org/login?service="));

        let creds = client
            .extract_credentials(&ctx("/callback?client_name=CasClient&ticket=ST-good", &s))
            .await
            .unwrap();
        assert_eq!(client.build_profile(creds).await.unwrap().id, "casuser");

        let rejected = client
            .extract_credentials(&ctx("/callback?client_name=CasClient&ticket=ST-bad", &s))
            .await;
        assert!(matches!(rejected, Err(AuthError::InvalidCredentials(_))));
    }

    #[test]
    fn protocols_name_their_callback_parameters() {
        assert_eq!(Protocol::OAuth2.credential_param(), "code");
        assert_eq!(Protocol::Saml2.state_param(), Some("RelayState"));
        assert_eq!(Protocol::Cas.state_param(), None);
    }
}
