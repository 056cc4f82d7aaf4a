/*
 * Responsibility
 * - auth: route protection (security handler)
 * - session: cookie -> Session in request extensions
 * - error_pages: bodies for bare 401/403/500
 * - http / security_headers: transport layers for the whole router
 */
pub mod auth;
pub mod error_pages;
pub mod http;
pub mod security_headers;
pub mod session;
