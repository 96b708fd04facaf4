//! File-backed persistence for the vault chat.
//!
//! Implements the core repository seams with durable files under the user's
//! config directory: the transcript as versioned JSON, speaker profiles as
//! a TOML asset.

pub mod paths;
pub mod profile_repository;
pub mod storage;
pub mod transcript_repository;

pub use paths::VaultchatPaths;
pub use profile_repository::TomlSpeakerProfileRepository;
pub use storage::AtomicJsonFile;
pub use transcript_repository::JsonTranscriptRepository;
