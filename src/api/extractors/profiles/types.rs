/*
 * Responsibility
 * - the authenticated identity as seen by a protected handler
 * - inserted into request extensions by the security middleware
 */
use crate::services::auth::UserProfile;

/// Profiles that satisfied the route's rule; never empty.
#[derive(Debug, Clone)]
pub struct AuthenticatedProfiles {
    pub profiles: Vec<UserProfile>,
}

impl AuthenticatedProfiles {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        Self { profiles }
    }

    /// First profile, the one that granted access.
    pub fn primary(&self) -> Option<&UserProfile> {
        self.profiles.first()
    }
}
