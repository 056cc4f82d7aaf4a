/*
 * Responsibility
 * - read settings from the environment (.env allowed via dotenvy)
 * - validate them; a missing or invalid value fails startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::services::auth::jwt::MIN_SECRET_BYTES;
use crate::services::auth::security_config::{
    DEFAULT_LOGOUT_URL, DEFAULT_LOGOUT_URL_PATTERN, DEFAULT_SUCCESS_URL,
};

/// Signing secret used outside production when `JWT_SECRET` is unset.
const DEVELOPMENT_JWT_SECRET: &str = "12345678901234567890123456789012";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // pipeline urls
    pub callback_url: Url,
    pub default_success_url: String,
    pub default_logout_url: String,
    pub logout_url_pattern: String,
    pub form_login_url: String,

    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,

    pub token_parameter: String,
    pub token_parameter_get: bool,
    pub token_parameter_post: bool,

    pub admin_role_clients: Vec<String>,
    pub custom_authorizer_id_prefix: String,

    pub session_cookie_name: String,
    pub session_ttl: Duration,
    pub valkey_url: Option<String>,

    pub http_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the signing secret
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("callback_url", &self.callback_url.as_str())
            .field("session_cookie_name", &self.session_cookie_name)
            .field("valkey", &self.valkey_url.is_some())
            .finish_non_exhaustive()
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        _ => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 8080)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let callback_url = Url::parse(&var_or("CALLBACK_URL", "http://localhost:8080/callback"))
            .map_err(|_| ConfigError::Invalid("CALLBACK_URL"))?;

        let logout_url_pattern = var_or("LOGOUT_URL_PATTERN", DEFAULT_LOGOUT_URL_PATTERN);
        regex::Regex::new(&logout_url_pattern)
            .map_err(|_| ConfigError::Invalid("LOGOUT_URL_PATTERN"))?;

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if app_env.is_production() => return Err(ConfigError::Missing("JWT_SECRET")),
            _ => DEVELOPMENT_JWT_SECRET.to_string(),
        };
        if jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        Ok(Self {
            addr,
            app_env,
            callback_url,
            default_success_url: var_or("DEFAULT_SUCCESS_URL", DEFAULT_SUCCESS_URL),
            default_logout_url: var_or("DEFAULT_LOGOUT_URL", DEFAULT_LOGOUT_URL),
            logout_url_pattern,
            form_login_url: var_or("FORM_LOGIN_URL", "http://localhost:8080/loginForm.html"),
            jwt_secret,
            jwt_ttl_seconds: parse_or("JWT_TTL_SECONDS", 3600)?,
            token_parameter: var_or("TOKEN_PARAMETER", "token"),
            token_parameter_get: parse_or("TOKEN_PARAMETER_GET", true)?,
            token_parameter_post: parse_or("TOKEN_PARAMETER_POST", false)?,
            admin_role_clients: split_list(&var_or("ADMIN_ROLE_CLIENTS", "IndirectBasicAuthClient")),
            custom_authorizer_id_prefix: var_or("CUSTOM_AUTHORIZER_ID_PREFIX", "jle"),
            session_cookie_name: var_or("SESSION_COOKIE_NAME", "SESSIONID"),
            session_ttl: Duration::from_secs(parse_or("SESSION_TTL_SECONDS", 1800)?),
            valkey_url: std::env::var("VALKEY_URL").ok().filter(|v| !v.trim().is_empty()),
            http_timeout: Duration::from_secs(parse_or("HTTP_TIMEOUT_SECONDS", 30)?),
        })
    }

    /// Development defaults, without reading the environment.
    pub fn development() -> Result<Self, ConfigError> {
        Ok(Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            app_env: AppEnv::Development,
            callback_url: Url::parse("http://localhost:8080/callback")
                .map_err(|_| ConfigError::Invalid("CALLBACK_URL"))?,
            default_success_url: DEFAULT_SUCCESS_URL.to_string(),
            default_logout_url: DEFAULT_LOGOUT_URL.to_string(),
            logout_url_pattern: DEFAULT_LOGOUT_URL_PATTERN.to_string(),
            form_login_url: "http://localhost:8080/loginForm.html".to_string(),
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            jwt_ttl_seconds: 3600,
            token_parameter: "token".to_string(),
            token_parameter_get: true,
            token_parameter_post: false,
            admin_role_clients: vec!["IndirectBasicAuthClient".to_string()],
            custom_authorizer_id_prefix: "jle".to_string(),
            session_cookie_name: "SESSIONID".to_string(),
            session_ttl: Duration::from_secs(1800),
            valkey_url: None,
            http_timeout: Duration::from_secs(30),
        })
    }
}
