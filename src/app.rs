/*
 * Responsibility
 * - Config -> dependencies (security config, session store, JWT) -> Router
 * - middleware stacking (session, error pages, headers, http layers)
 * - axum::serve()
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{
    self, error_pages::ErrorPages, session::SessionCookie,
};
use crate::services::auth::build_security_config;
use crate::services::auth::clients::Client;
use crate::services::auth::jwt::JwtGenerator;
use crate::services::session::{MemorySessionStore, SharedSessionStore, ValkeySessionStore};
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing() {
    // RUST_LOG=info,authgate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash so it gets noticed
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting authgate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config, Vec::new()).await?;
    let app = build_router(state, &config, Router::new());

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(AppError::from)?;
    axum::serve(listener, app).await.map_err(AppError::from)?;

    Ok(())
}

/// Process-level services. `extra_clients` are registered after the
/// built-in ones (protocol clients and their backends go here).
pub async fn build_state(config: &Config, extra_clients: Vec<Client>) -> Result<AppState, AppError> {
    let security = build_security_config(config, extra_clients)?;

    let sessions: SharedSessionStore = match &config.valkey_url {
        Some(url) => {
            let store = ValkeySessionStore::new(url, config.session_ttl).await?;
            tracing::info!("sessions stored in valkey");
            Arc::new(store)
        }
        None => {
            tracing::info!(ttl = ?config.session_ttl, "sessions stored in memory");
            let store = Arc::new(MemorySessionStore::new(config.session_ttl));
            let _sweeper = MemorySessionStore::spawn_sweeper(&store, SESSION_SWEEP_INTERVAL);
            store as SharedSessionStore
        }
    };

    let jwt = Arc::new(JwtGenerator::new(
        config.jwt_secret.as_bytes(),
        config.jwt_ttl_seconds,
    )?);

    let session_cookie = SessionCookie::new(
        config.session_cookie_name.clone(),
        config.app_env.is_production(),
    );

    Ok(AppState::new(security, sessions, jwt, session_cookie))
}

/// Demo routes plus `extra` (already protected with `api::secured` or
/// `middleware::auth::protect`), wrapped in the full middleware stack.
pub fn build_router(state: AppState, config: &Config, extra: Router<AppState>) -> Router {
    let router = api::routes(&state).merge(extra);
    let router = middleware::session::apply(router, state.clone()).with_state(state);

    let router = middleware::error_pages::apply(router, ErrorPages::default());
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, config.http_timeout)
}
