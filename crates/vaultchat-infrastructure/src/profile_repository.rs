//! TOML-backed speaker profile repository.
//!
//! Speaker profiles are configuration assets (the Rust analog of the
//! original game's editor-authored profile objects), stored as an array of
//! tables:
//!
//! ```toml
//! [[speakers]]
//! name = "YOU"
//! name_color = "green"
//!
//! [[speakers]]
//! name = "Marcus"
//! backstory = "Vault engineer since day one"
//! personality = "dry, protective"
//! permitted_actions = "repair machinery, ration supplies"
//! name_color = "cyan"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use vaultchat_core::{InMemorySpeakerRegistry, Result, SpeakerProfile, VaultError};

use crate::paths::VaultchatPaths;

#[derive(Debug, Deserialize)]
struct SpeakerAssetFile {
    #[serde(default)]
    speakers: Vec<SpeakerProfile>,
}

/// Loads speaker profiles from a TOML asset file.
pub struct TomlSpeakerProfileRepository {
    path: PathBuf,
}

impl TomlSpeakerProfileRepository {
    /// Creates a repository backed by the given asset file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates a repository at the default location
    /// (`~/.config/vaultchat/speakers.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(VaultchatPaths::speakers_file()?))
    }

    /// Loads every profile from the asset file.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Io`] when the file cannot be read (including a
    ///   missing file; callers that want built-in defaults handle that).
    /// - [`VaultError::Parse`] when the file is not valid TOML.
    pub fn load_all(&self) -> Result<Vec<SpeakerProfile>> {
        let content = fs::read_to_string(&self.path).map_err(|err| {
            VaultError::io(format!(
                "cannot read speaker asset file {}: {err}",
                self.path.display()
            ))
        })?;
        let asset: SpeakerAssetFile = toml::from_str(&content)?;
        Ok(asset.speakers)
    }

    /// Loads every profile and builds a registry from them.
    pub fn load_registry(&self) -> Result<InMemorySpeakerRegistry> {
        Ok(InMemorySpeakerRegistry::from_profiles(self.load_all()?))
    }
}
