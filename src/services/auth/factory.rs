/// Factory: build the demo `SecurityConfig` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AuthResult;
use crate::services::auth::authenticator::{
    SharedAuthenticator, SimpleTestUsernamePasswordAuthenticator,
};
use crate::services::auth::authorizer::{AuthorizerRegistry, RequireAnyRole};
use crate::services::auth::clients::{
    AnonymousClient, Client, ClientRegistry, DirectBasicAuthClient, FormClient,
    IndirectBasicAuthClient, ParameterClient,
};
use crate::services::auth::jwt::JwtAuthenticator;
use crate::services::auth::profile::{ProfileBuilder, UserProfile};
use crate::services::auth::security_config::SecurityConfig;

pub const ADMIN_AUTHORIZER: &str = "admin";
pub const CUSTOM_AUTHORIZER: &str = "custom";
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Built-in clients plus `extra` (e.g. protocol clients with their backend).
pub fn build_security_config(config: &Config, extra: Vec<Client>) -> AuthResult<Arc<SecurityConfig>> {
    let test_authenticator: SharedAuthenticator =
        Arc::new(SimpleTestUsernamePasswordAuthenticator::new());
    let jwt_authenticator: SharedAuthenticator =
        Arc::new(JwtAuthenticator::new(config.jwt_secret.as_bytes())?);

    let mut clients = ClientRegistry::new();
    clients.register(Client::indirect(FormClient::new(
        config.form_login_url.clone(),
        test_authenticator.clone(),
    )))?;
    clients.register(Client::indirect(IndirectBasicAuthClient::new(
        &config.callback_url,
        test_authenticator.clone(),
    )))?;
    clients.register(Client::direct(
        ParameterClient::new(config.token_parameter.clone(), jwt_authenticator)
            .support_get(config.token_parameter_get)
            .support_post(config.token_parameter_post),
    ))?;
    clients.register(Client::direct(DirectBasicAuthClient::new(test_authenticator)))?;
    clients.register(Client::direct(AnonymousClient::new()))?;
    for client in extra {
        clients.register(client)?;
    }

    let mut authorizers = AuthorizerRegistry::new();
    authorizers.register(ADMIN_AUTHORIZER, RequireAnyRole::new([ADMIN_ROLE]))?;
    let prefix = config.custom_authorizer_id_prefix.clone();
    authorizers.register(CUSTOM_AUTHORIZER, move |profiles: &[UserProfile]| {
        profiles
            .iter()
            .any(|p| !p.is_anonymous() && p.id.starts_with(prefix.as_str()))
    })?;

    let mut profile_builder = ProfileBuilder::new();
    for client_name in &config.admin_role_clients {
        profile_builder.add_generator(client_name.clone(), |profile| profile.with_role(ADMIN_ROLE));
    }

    let security = SecurityConfig::new(clients, authorizers)?
        .with_profile_builder(profile_builder)
        .with_callback_url(config.callback_url.clone())
        .with_default_success_url(config.default_success_url.clone())
        .with_default_logout_url(config.default_logout_url.clone())
        .with_logout_url_pattern(&config.logout_url_pattern)?;

    tracing::info!(
        clients = ?security.clients.names().collect::<Vec<_>>(),
        "security configuration ready"
    );

    Ok(Arc::new(security))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::AuthError;
    use crate::services::auth::clients::ClientKind;

    #[test]
    fn registers_the_built_in_clients() {
        let security = build_security_config(&Config::development().unwrap(), Vec::new()).unwrap();

        assert_eq!(
            security.clients.names().collect::<Vec<_>>(),
            [
                "FormClient",
                "IndirectBasicAuthClient",
                "ParameterClient",
                "DirectBasicAuthClient",
                "AnonymousClient"
            ]
        );
        assert_eq!(
            security.clients.resolve("FormClient").unwrap().kind(),
            ClientKind::Indirect
        );
        assert!(security.authorizers.contains(ADMIN_AUTHORIZER));
        assert!(security.authorizers.contains(CUSTOM_AUTHORIZER));
    }

    #[test]
    fn custom_authorizer_checks_the_id_prefix() {
        let security = build_security_config(&Config::development().unwrap(), Vec::new()).unwrap();

        let jle = [UserProfile::new("jleleu")];
        let bob = [UserProfile::new("bob")];
        assert!(security.authorizers.evaluate(CUSTOM_AUTHORIZER, &jle).unwrap());
        assert!(!security.authorizers.evaluate(CUSTOM_AUTHORIZER, &bob).unwrap());
    }

    #[test]
    fn extra_client_cannot_reuse_a_built_in_name() {
        let extra = vec![Client::direct(AnonymousClient::new())];
        let res = build_security_config(&Config::development().unwrap(), extra);

        assert!(matches!(res, Err(AuthError::DuplicateName { kind: "client", .. })));
    }
}
