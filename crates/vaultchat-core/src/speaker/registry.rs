//! Speaker profile resolution.
//!
//! The persisted transcript stores speaker names only; reloading it needs a
//! live registry to turn names back into profile references.

use std::collections::HashMap;
use std::sync::Arc;

use super::model::SpeakerProfile;

/// Resolves a speaker name to a live profile.
///
/// Used during transcript load: the wire form keeps only the name, so every
/// entry must be re-bound to a profile known to the current session.
pub trait SpeakerRegistry: Send + Sync {
    /// Returns the profile registered under `name`, if any.
    fn resolve(&self, name: &str) -> Option<Arc<SpeakerProfile>>;
}

/// A registry backed by an in-memory name-to-profile map.
#[derive(Default)]
pub struct InMemorySpeakerRegistry {
    profiles: HashMap<String, Arc<SpeakerProfile>>,
}

impl InMemorySpeakerRegistry {
    /// Builds a registry from a list of profiles.
    ///
    /// Later entries with a duplicate name replace earlier ones; names are
    /// expected to be unique within a session.
    pub fn from_profiles(profiles: impl IntoIterator<Item = SpeakerProfile>) -> Self {
        let mut registry = Self::default();
        for profile in profiles {
            registry.insert(profile);
        }
        registry
    }

    /// Registers a profile under its name.
    pub fn insert(&mut self, profile: SpeakerProfile) {
        self.profiles
            .insert(profile.name.clone(), Arc::new(profile));
    }

    /// Returns the registered names in arbitrary order.
    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Number of registered profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when no profiles are registered.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl SpeakerRegistry for InMemorySpeakerRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<SpeakerProfile>> {
        self.profiles.get(name).cloned()
    }
}
