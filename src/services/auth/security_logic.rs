/*
 * Responsibility
 * - per-request decision for a protected route: continue with the profiles,
 *   or halt with a redirect / 401 / 403 / 500
 * - client precedence is left to right, first success wins, nothing is merged
 */
use crate::services::auth::action::{AuthOutcome, HttpAction};
use crate::services::auth::clients::{CLIENT_NAME_PARAM, Client, IndirectClient};
use crate::services::auth::context::WebContext;
use crate::services::auth::error::{AuthError, AuthResult};
use crate::services::auth::profile::UserProfile;
use crate::services::auth::rule::RouteSecurityRule;
use crate::services::auth::security_config::SecurityConfig;

/// Runs the security check for one request. Never fails: every error is
/// turned into the matching [`HttpAction`].
pub async fn perform(
    config: &SecurityConfig,
    ctx: &WebContext,
    rule: &RouteSecurityRule,
) -> AuthOutcome {
    match check(config, ctx, rule).await {
        Ok(outcome) => outcome,
        Err(err) => {
            log_failure(&err, rule);
            AuthOutcome::Halt(err.to_action())
        }
    }
}

async fn check(
    config: &SecurityConfig,
    ctx: &WebContext,
    rule: &RouteSecurityRule,
) -> AuthResult<AuthOutcome> {
    let session = ctx.session();
    let stored = session.profiles().await?;

    if rule.clients().is_empty() {
        if stored.is_empty() {
            tracing::debug!(route = rule.pattern(), "no profile in session");
            return Ok(AuthOutcome::Halt(HttpAction::unauthorized()));
        }
        return authorize(config, rule, stored.into_vec());
    }

    let clients = select_clients(config, ctx, rule)?;

    let mut pending: Option<&dyn IndirectClient> = None;
    for client in clients {
        if let Some(profile) = stored.get(client.name()) {
            tracing::debug!(client = client.name(), "profile found in session");
            return authorize(config, rule, vec![profile.clone()]);
        }

        match client {
            Client::Direct(_) => match config.profile_builder.authenticate(client, ctx).await {
                Ok(profile) => {
                    if !profile.is_anonymous() {
                        session.save_profile(profile.clone()).await?;
                    }
                    tracing::debug!(client = client.name(), user = %profile.id, "authenticated");
                    return authorize(config, rule, vec![profile]);
                }
                Err(err) if err.is_credentials_failure() => {
                    tracing::debug!(client = client.name(), error = %err, "trying next client");
                }
                Err(err) => return Err(err),
            },
            Client::Indirect(indirect) => {
                pending.get_or_insert(indirect.as_ref());
            }
        }
    }

    match pending {
        Some(_) if ctx.is_ajax() => {
            tracing::debug!(route = rule.pattern(), "ajax request, no redirect");
            Ok(AuthOutcome::Halt(HttpAction::unauthorized()))
        }
        Some(client) => {
            session.set_requested_url(&ctx.requested_url()).await?;
            let action = client.redirection_action(ctx).await?;
            tracing::debug!(client = client.name(), "starting login");
            Ok(AuthOutcome::Halt(action))
        }
        None => Ok(AuthOutcome::Halt(HttpAction::unauthorized())),
    }
}

/// The rule's clients in declared order, or just the one named by the
/// `client_name` parameter when it belongs to the rule.
fn select_clients<'a>(
    config: &'a SecurityConfig,
    ctx: &WebContext,
    rule: &RouteSecurityRule,
) -> AuthResult<Vec<&'a Client>> {
    let clients = config.clients.resolve_all(rule.clients())?;

    if let Some(name) = ctx.request_param(CLIENT_NAME_PARAM) {
        if let Some(client) = clients.iter().copied().find(|c| c.name() == name) {
            return Ok(vec![client]);
        }
    }
    Ok(clients)
}

fn authorize(
    config: &SecurityConfig,
    rule: &RouteSecurityRule,
    profiles: Vec<UserProfile>,
) -> AuthResult<AuthOutcome> {
    for name in rule.authorizers() {
        if !config.authorizers.evaluate(name, &profiles)? {
            tracing::warn!(route = rule.pattern(), authorizer = %name, "access denied");
            return Err(AuthError::AuthorizationDenied);
        }
    }
    Ok(AuthOutcome::Continue(profiles))
}

fn log_failure(err: &AuthError, rule: &RouteSecurityRule) {
    match err.to_action() {
        HttpAction::InternalError => {
            tracing::error!(route = rule.pattern(), error = %err, "security check failed")
        }
        // denial already logged by `authorize`
        HttpAction::Forbidden => {}
        _ => tracing::warn!(route = rule.pattern(), error = %err, "security check rejected"),
    }
}
