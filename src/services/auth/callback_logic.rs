/*
 * Responsibility
 * - finish an indirect login on the callback endpoint: validate what the
 *   provider sent back, store the profile, go back to the requested url
 * - start an indirect login on demand (force login)
 */
use crate::services::auth::action::HttpAction;
use crate::services::auth::clients::{CLIENT_NAME_PARAM, Client};
use crate::services::auth::context::WebContext;
use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::security_config::SecurityConfig;

/// Handles `/callback?client_name=<name>`.
pub async fn perform(config: &SecurityConfig, ctx: &WebContext) -> HttpAction {
    let client = match resolve_indirect(config, ctx) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "callback rejected");
            return err.to_action();
        }
    };

    match finish_login(config, ctx, client).await {
        Ok(action) => action,
        Err(err) if err.is_credentials_failure() => {
            tracing::warn!(client = client.name(), error = %err, "login failed");
            let challenge = client.as_indirect().and_then(|c| c.challenge());
            match challenge {
                Some(challenge) => HttpAction::challenge(challenge),
                None => HttpAction::unauthorized(),
            }
        }
        Err(err) => {
            tracing::error!(client = client.name(), error = %err, "callback failed");
            err.to_action()
        }
    }
}

/// Emits the redirection of the indirect client named by `client_name`,
/// whether or not the caller is already authenticated.
pub async fn force_login(config: &SecurityConfig, ctx: &WebContext) -> HttpAction {
    match start_login(config, ctx).await {
        Ok(action) => action,
        Err(err) => {
            tracing::error!(error = %err, "force login failed");
            err.to_action()
        }
    }
}

async fn start_login(config: &SecurityConfig, ctx: &WebContext) -> AuthResult<HttpAction> {
    let client = resolve_indirect(config, ctx)?;
    let Some(indirect) = client.as_indirect() else {
        return Err(not_indirect(client.name()));
    };
    indirect.redirection_action(ctx).await
}

fn resolve_indirect<'a>(config: &'a SecurityConfig, ctx: &WebContext) -> AuthResult<&'a Client> {
    let name = ctx
        .request_param(CLIENT_NAME_PARAM)
        .filter(|n| !n.trim().is_empty())
        .ok_or(AuthError::MissingClientName)?;

    let client = config.clients.resolve(name)?;
    if client.as_indirect().is_none() {
        return Err(not_indirect(name));
    }
    Ok(client)
}

fn not_indirect(name: &str) -> AuthError {
    AuthError::Configuration(format!("{name} is not an indirect client"))
}

async fn finish_login(
    config: &SecurityConfig,
    ctx: &WebContext,
    client: &Client,
) -> AuthResult<HttpAction> {
    let profile = config.profile_builder.authenticate(client, ctx).await?;
    tracing::info!(client = client.name(), user = %profile.id, "login succeeded");

    let session = ctx.session();
    session.save_profile(profile).await?;
    // an id planted before login must not carry the authenticated session
    session.renew().await?;

    let target = session
        .take_requested_url()
        .await?
        .unwrap_or_else(|| config.default_success_url.clone());
    Ok(HttpAction::redirect(target))
}
