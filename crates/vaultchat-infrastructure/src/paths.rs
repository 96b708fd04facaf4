//! Default file locations for vaultchat data.
//!
//! Everything lives under the platform config directory:
//!
//! ```text
//! ~/.config/vaultchat/
//! ├── config.toml       # application configuration
//! ├── speakers.toml     # speaker profile assets
//! └── chat_logs.json    # persisted transcript
//! ```

use std::path::PathBuf;

use vaultchat_core::{Result, VaultError};

/// Unified path resolution for vaultchat files.
pub struct VaultchatPaths;

impl VaultchatPaths {
    /// Returns the vaultchat configuration directory.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Config`] when the platform config directory
    /// cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("vaultchat"))
            .ok_or_else(|| VaultError::config("cannot determine the user config directory"))
    }

    /// Default path of the application config file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default path of the speaker profile asset file.
    pub fn speakers_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("speakers.toml"))
    }

    /// Default path of the persisted transcript.
    pub fn transcript_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("chat_logs.json"))
    }
}
