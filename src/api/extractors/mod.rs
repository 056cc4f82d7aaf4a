pub mod profiles;
pub mod web_context;

pub use profiles::{AuthenticatedProfiles, ProfilesExtractor};
pub use web_context::RequestContext;
