//! Speaker profile domain model.
//!
//! A speaker profile is the static persona data for one conversation
//! participant: the player or an NPC resident of the vault.

use serde::{Deserialize, Serialize};

/// Static identity and persona data for one conversation participant.
///
/// Profiles are loaded from configuration assets, immutable afterwards, and
/// shared by reference (`Arc`) between the transcript and the UI. Messages
/// reference a profile but never own it. The color fields are display hints
/// that the core carries opaquely for the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerProfile {
    /// Display name, unique within a session.
    pub name: String,
    /// Background description used in the NPC instruction block.
    #[serde(default)]
    pub backstory: String,
    /// Personality the NPC should stay in at all times.
    #[serde(default)]
    pub personality: String,
    /// Free-text description of what the speaker is allowed to do.
    #[serde(default)]
    pub permitted_actions: String,
    /// Display hint for the speaker name color. Opaque to the core.
    #[serde(default)]
    pub name_color: String,
    /// Display hint for the message text color. Opaque to the core.
    #[serde(default)]
    pub text_color: String,
}

impl SpeakerProfile {
    /// Creates a profile with the given name and empty persona fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backstory: String::new(),
            personality: String::new(),
            permitted_actions: String::new(),
            name_color: String::new(),
            text_color: String::new(),
        }
    }
}
