//! Authentication orchestration for axum services: route protection by
//! ordered clients and named authorizers, indirect login callbacks, logout,
//! and per-session profile storage.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
