use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::services::auth::profile::UserProfile;

/// Profiles authenticated in one session, at most one per client name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionProfiles {
    profiles: BTreeMap<String, UserProfile>,
}

impl SessionProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, client_name: &str) -> Option<&UserProfile> {
        self.profiles.get(client_name)
    }

    /// Stores `profile` under its client name, returning the profile it replaced.
    pub fn insert(&mut self, profile: UserProfile) -> Option<UserProfile> {
        self.profiles.insert(profile.client_name.clone(), profile)
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserProfile> {
        self.profiles.values()
    }

    pub fn into_vec(self) -> Vec<UserProfile> {
        self.profiles.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, client: &str) -> UserProfile {
        let mut p = UserProfile::new(id);
        p.client_name = client.to_string();
        p
    }

    #[test]
    fn writing_the_same_client_overwrites_only_that_entry() {
        let mut profiles = SessionProfiles::new();
        profiles.insert(profile("alice", "FormClient"));
        profiles.insert(profile("bob", "ParameterClient"));

        let replaced = profiles.insert(profile("carol", "FormClient"));

        assert_eq!(replaced.map(|p| p.id), Some("alice".to_string()));
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles.get("FormClient").map(|p| p.id.as_str()), Some("carol"));
        assert_eq!(
            profiles.get("ParameterClient").map(|p| p.id.as_str()),
            Some("bob")
        );
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let mut profiles = SessionProfiles::new();
        profiles.insert(profile("alice", "FormClient"));

        let json = serde_json::to_value(&profiles).unwrap();
        assert_eq!(json["FormClient"]["id"], "alice");

        let back: SessionProfiles = serde_json::from_value(json).unwrap();
        assert_eq!(back, profiles);
    }
}
