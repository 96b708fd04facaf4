//! Message domain model.

use std::sync::Arc;

use crate::speaker::SpeakerProfile;

/// One conversation turn: an utterance attributed to a speaker.
///
/// The sequence index is implicit in the message's position in the
/// transcript. Messages are immutable after creation and are destroyed only
/// by FIFO eviction when the transcript is at capacity.
#[derive(Debug, Clone)]
pub struct Message {
    /// The speaker this turn is attributed to. Referenced, not owned.
    pub speaker: Arc<SpeakerProfile>,
    /// The unformatted utterance text.
    pub raw_text: String,
}

impl Message {
    /// Creates a message attributed to `speaker`.
    pub fn new(speaker: Arc<SpeakerProfile>, raw_text: impl Into<String>) -> Self {
        Self {
            speaker,
            raw_text: raw_text.into(),
        }
    }

    /// The speaker's display name.
    pub fn speaker_name(&self) -> &str {
        &self.speaker.name
    }
}
