/*!
 * Authenticated profiles extractor
 *
 * Public API:
 * - AuthenticatedProfiles
 * - ProfilesExtractor
 */

mod core;
mod types;

pub use core::ProfilesExtractor;
pub use types::AuthenticatedProfiles;
