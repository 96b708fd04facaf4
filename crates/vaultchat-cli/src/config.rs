//! CLI configuration loaded from `config.toml`.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use vaultchat_core::{Result, StoryContext, DEFAULT_MAX_MESSAGES};
use vaultchat_infrastructure::VaultchatPaths;

/// Settings for a vaultchat session.
///
/// Every field has a default, so a missing or partial config file still
/// yields a runnable setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultchatConfig {
    /// Where the transcript JSON lives. Defaults to the platform config dir.
    pub transcript_path: Option<PathBuf>,
    /// Where the speaker profiles TOML lives. Defaults to the platform
    /// config dir.
    pub speakers_path: Option<PathBuf>,
    /// Model override passed to the completion gateway.
    pub model: Option<String>,
    /// Transcript capacity; older turns are evicted past this.
    pub max_messages: usize,
    /// Name of the profile the player speaks as.
    pub player: String,
    /// Name of the profile replies are generated for.
    pub npc: String,
    /// Background fed into the system prompt.
    pub story: StoryContext,
}

impl Default for VaultchatConfig {
    fn default() -> Self {
        Self {
            transcript_path: None,
            speakers_path: None,
            model: None,
            max_messages: DEFAULT_MAX_MESSAGES,
            player: "YOU".to_string(),
            npc: "Marcus".to_string(),
            story: StoryContext::default(),
        }
    }
}

impl VaultchatConfig {
    /// Loads configuration from `path`, or from the default location when
    /// `path` is `None`. A missing file yields the defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => VaultchatPaths::config_file()?,
        };

        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolves the transcript path, falling back to the platform default.
    pub fn transcript_path(&self) -> Result<PathBuf> {
        match &self.transcript_path {
            Some(path) => Ok(path.clone()),
            None => VaultchatPaths::transcript_file(),
        }
    }

    /// Resolves the speaker asset path, falling back to the platform default.
    pub fn speakers_path(&self) -> Result<PathBuf> {
        match &self.speakers_path {
            Some(path) => Ok(path.clone()),
            None => VaultchatPaths::speakers_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VaultchatConfig::load(Some(dir.path().join("config.toml"))).unwrap();

        assert_eq!(config.max_messages, DEFAULT_MAX_MESSAGES);
        assert_eq!(config.player, "YOU");
        assert_eq!(config.npc, "Marcus");
        assert!(config.model.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
max_messages = 10

[story]
first_day = "The door sealed behind us."
current_day = 3
"#
        )
        .unwrap();

        let config = VaultchatConfig::load(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.max_messages, 10);
        assert_eq!(config.player, "YOU");
        assert_eq!(config.story.first_day, "The door sealed behind us.");
        assert_eq!(config.story.current_day, 3);
        assert!(config.story.daily_logs.is_empty());
    }

    #[test]
    fn explicit_paths_win_over_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
transcript_path = "/tmp/vault/chat_logs.json"
speakers_path = "/tmp/vault/speakers.toml"
model = "gpt-4.1-mini"
"#
        )
        .unwrap();

        let config = VaultchatConfig::load(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(
            config.transcript_path().unwrap(),
            PathBuf::from("/tmp/vault/chat_logs.json")
        );
        assert_eq!(
            config.speakers_path().unwrap(),
            PathBuf::from("/tmp/vault/speakers.toml")
        );
        assert_eq!(config.model.as_deref(), Some("gpt-4.1-mini"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_messages = \"lots\"").unwrap();

        let err = VaultchatConfig::load(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.is_parse());
    }
}
