//! JSON-file TranscriptRepository implementation.
//!
//! The wire form is a lossy projection of the in-memory transcript:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "messages": [
//!     { "speakerName": "YOU", "text": "Hello?" },
//!     { "speakerName": "Marcus", "text": "\"Hello there.\"" }
//!   ]
//! }
//! ```
//!
//! Array order is chronological. Files written before the schema version
//! was introduced carry no `schemaVersion` field and are read as version 1;
//! files from a newer schema are rejected rather than silently mis-parsed.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vaultchat_core::{
    Message, Result, SpeakerRegistry, TranscriptRepository, VaultError,
};

use crate::paths::VaultchatPaths;
use crate::storage::AtomicJsonFile;

/// Current transcript wire schema version.
pub const TRANSCRIPT_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    TRANSCRIPT_SCHEMA_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
struct TranscriptFileV1 {
    #[serde(rename = "schemaVersion", default = "default_schema_version")]
    schema_version: u32,
    messages: Vec<PersistedMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedMessage {
    #[serde(rename = "speakerName")]
    speaker_name: String,
    text: String,
}

/// Persists the transcript as a single JSON file with atomic writes.
pub struct JsonTranscriptRepository {
    file: AtomicJsonFile<TranscriptFileV1>,
}

impl JsonTranscriptRepository {
    /// Creates a repository backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    /// Creates a repository at the default location
    /// (`~/.config/vaultchat/chat_logs.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(VaultchatPaths::transcript_file()?))
    }
}

#[async_trait]
impl TranscriptRepository for JsonTranscriptRepository {
    async fn save(&self, messages: &[Message]) -> Result<()> {
        if messages.is_empty() {
            tracing::warn!(
                path = %self.file.path().display(),
                "transcript is empty, skipping persist"
            );
            return Ok(());
        }

        let dto = TranscriptFileV1 {
            schema_version: TRANSCRIPT_SCHEMA_VERSION,
            messages: messages
                .iter()
                .map(|message| PersistedMessage {
                    speaker_name: message.speaker_name().to_string(),
                    text: message.raw_text.clone(),
                })
                .collect(),
        };

        self.file.save(&dto)?;
        tracing::debug!(
            count = dto.messages.len(),
            path = %self.file.path().display(),
            "persisted transcript"
        );
        Ok(())
    }

    async fn load(&self, registry: &dyn SpeakerRegistry) -> Result<Vec<Message>> {
        let Some(dto) = self.file.load()? else {
            // No save file yet: start with an empty transcript.
            return Ok(Vec::new());
        };

        if dto.schema_version > TRANSCRIPT_SCHEMA_VERSION {
            return Err(VaultError::parse(
                "JSON",
                format!(
                    "transcript schema version {} is newer than the supported version {}",
                    dto.schema_version, TRANSCRIPT_SCHEMA_VERSION
                ),
            ));
        }

        dto.messages
            .into_iter()
            .map(|entry| {
                let speaker = registry
                    .resolve(&entry.speaker_name)
                    .ok_or_else(|| VaultError::unknown_speaker(&entry.speaker_name))?;
                Ok(Message::new(speaker, entry.text))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use tempfile::TempDir;

    use vaultchat_core::{InMemorySpeakerRegistry, SpeakerProfile};

    use super::*;

    fn registry() -> InMemorySpeakerRegistry {
        InMemorySpeakerRegistry::from_profiles(vec![
            SpeakerProfile::new("YOU"),
            SpeakerProfile::new("Marcus"),
        ])
    }

    fn msg(name: &str, text: &str) -> Message {
        Message::new(Arc::new(SpeakerProfile::new(name)), text)
    }

    #[tokio::test]
    async fn save_then_load_preserves_pairs_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonTranscriptRepository::new(temp_dir.path().join("chat_logs.json"));

        let messages = vec![
            msg("YOU", "Hello?"),
            msg("Marcus", "\"Hello there.\""),
            msg("YOU", "Who else is down here?"),
        ];
        repository.save(&messages).await.unwrap();

        let loaded = repository.load(&registry()).await.unwrap();

        let pairs: Vec<(&str, &str)> = loaded
            .iter()
            .map(|m| (m.speaker_name(), m.raw_text.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("YOU", "Hello?"),
                ("Marcus", "\"Hello there.\""),
                ("YOU", "Who else is down here?"),
            ]
        );
    }

    #[tokio::test]
    async fn load_on_missing_path_is_an_empty_transcript() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonTranscriptRepository::new(temp_dir.path().join("missing.json"));

        let loaded = repository.load(&registry()).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn load_on_malformed_json_fails_with_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat_logs.json");
        fs::write(&path, "{ \"messages\": [ oops").unwrap();

        let repository = JsonTranscriptRepository::new(path);
        let err = repository.load(&registry()).await.unwrap_err();
        assert!(err.is_parse());
    }

    #[tokio::test]
    async fn unknown_speaker_fails_the_whole_load() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonTranscriptRepository::new(temp_dir.path().join("chat_logs.json"));

        let messages = vec![msg("YOU", "Hello?"), msg("Ghost", "boo")];
        repository.save(&messages).await.unwrap();

        let err = repository.load(&registry()).await.unwrap_err();
        assert!(matches!(err, VaultError::UnknownSpeaker { ref name } if name == "Ghost"));
    }

    #[tokio::test]
    async fn empty_transcript_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat_logs.json");
        let repository = JsonTranscriptRepository::new(path.clone());

        repository.save(&[]).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn saved_file_carries_the_schema_version() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat_logs.json");
        let repository = JsonTranscriptRepository::new(path.clone());

        repository.save(&[msg("YOU", "Hi")]).await.unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"schemaVersion\": 1"));
        assert!(raw.contains("\"speakerName\": \"YOU\""));
    }

    #[tokio::test]
    async fn files_without_a_version_field_load_as_version_one() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat_logs.json");
        fs::write(
            &path,
            r#"{ "messages": [ { "speakerName": "Marcus", "text": "\"Still here.\"" } ] }"#,
        )
        .unwrap();

        let repository = JsonTranscriptRepository::new(path);
        let loaded = repository.load(&registry()).await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].speaker_name(), "Marcus");
    }

    #[tokio::test]
    async fn newer_schema_versions_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat_logs.json");
        fs::write(
            &path,
            r#"{ "schemaVersion": 2, "messages": [] }"#,
        )
        .unwrap();

        let repository = JsonTranscriptRepository::new(path);
        let err = repository.load(&registry()).await.unwrap_err();
        assert!(err.is_parse());
    }
}
