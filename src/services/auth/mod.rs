pub mod action;
pub mod authenticator;
pub mod authorizer;
pub mod callback_logic;
pub mod clients;
pub mod context;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod jwt;
pub mod logout_logic;
pub mod profile;
pub mod rule;
pub mod security_config;
pub mod security_logic;

pub use action::{AuthOutcome, HttpAction};
pub use context::WebContext;
pub use error::{AuthError, AuthResult};
pub use factory::build_security_config;
pub use profile::UserProfile;
pub use rule::RouteSecurityRule;
pub use security_config::SecurityConfig;
