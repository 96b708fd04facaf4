//! Transcript repository trait.
//!
//! Defines the interface for transcript persistence, decoupling the
//! conversation core from the storage mechanism (JSON file, database, ...).

use async_trait::async_trait;

use super::model::Message;
use crate::error::Result;
use crate::speaker::SpeakerRegistry;

/// An abstract repository for persisting and reloading the transcript.
///
/// The wire form is a lossy projection of the in-memory transcript: the
/// speaker object graph is dropped and only speaker names survive.
/// Reloading therefore needs a [`SpeakerRegistry`] to re-bind each entry to
/// a live profile.
#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    /// Persists the transcript snapshot, overwriting any previous save.
    ///
    /// Implementations skip an empty snapshot with a logged warning instead
    /// of truncating the save file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::VaultError::Io`] when the save file cannot be
    /// written. The in-memory transcript is unaffected.
    async fn save(&self, messages: &[Message]) -> Result<()>;

    /// Loads the persisted transcript and resolves each entry's speaker.
    ///
    /// A missing save file is not an error: an empty transcript is returned.
    ///
    /// # Errors
    ///
    /// - [`crate::VaultError::Parse`] when the save file is malformed or
    ///   uses an unsupported schema version.
    /// - [`crate::VaultError::UnknownSpeaker`] when an entry references a
    ///   name the registry cannot resolve; the whole load fails and no
    ///   partial transcript is returned.
    async fn load(&self, registry: &dyn SpeakerRegistry) -> Result<Vec<Message>>;
}
