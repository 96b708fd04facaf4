//! Prompt derivation for an AI turn.
//!
//! The builder is a set of pure functions: identical inputs always produce
//! an identical payload, so the output is snapshot-testable. Each AI turn is
//! stateless from the model's point of view; everything it may rely on is
//! baked into a single system prompt string.

use serde::{Deserialize, Serialize};

use crate::speaker::SpeakerProfile;
use crate::transcript::Message;

/// Role tag for one entry of the model-input payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl PromptRole {
    /// The wire name chat-completion APIs expect.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptRole::System => "system",
            PromptRole::User => "user",
            PromptRole::Assistant => "assistant",
        }
    }
}

/// One role-tagged entry of the model-input payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

/// One dated entry of the vault's running story log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub context: String,
}

/// Scenario background fed into every system prompt.
///
/// All fields default to empty; a missing field renders as an empty string
/// in the prompt, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryContext {
    /// How the player's first day in the vault began.
    #[serde(default)]
    pub first_day: String,
    /// What the player remembers of their life before the vault.
    #[serde(default)]
    pub player_backlog: String,
    /// Roster of the vault residents, free text.
    #[serde(default)]
    pub residents: String,
    /// The current in-game day.
    #[serde(default)]
    pub current_day: u32,
    /// Dated log entries accumulated so far.
    #[serde(default)]
    pub daily_logs: Vec<DailyLog>,
}

/// Derives the model-input payload from a profile, story context, and the
/// transcript so far.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Renders the transcript as `"{speakerName}: {rawText}\n"` lines,
    /// trimmed. An empty transcript renders as an empty string.
    pub fn render_chat_log(messages: &[Message]) -> String {
        let mut log = String::new();
        for message in messages {
            log.push_str(message.speaker_name());
            log.push_str(": ");
            log.push_str(&message.raw_text);
            log.push('\n');
        }
        log.trim().to_string()
    }

    /// Builds the system prompt for one AI turn.
    ///
    /// Deterministic concatenation of the story background, the resident
    /// roster, the conversation so far, the NPC instruction block, and the
    /// formatting rules. Pure function of its inputs.
    pub fn build_system_prompt(
        profile: &SpeakerProfile,
        story: &StoryContext,
        messages: &[Message],
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str("Setting: a survival vault.\n");
        prompt.push_str(&format!("How it began: {}\n", story.first_day));
        prompt.push_str(&format!(
            "What the player remembers: {}\n",
            story.player_backlog
        ));
        prompt.push_str(&format!("Vault residents: {}\n", story.residents));
        prompt.push_str(&format!("Current day: {}\n", story.current_day));
        for log in &story.daily_logs {
            prompt.push_str(&format!("Day {}: {}\n", log.day, log.context));
        }
        prompt.push('\n');

        prompt.push_str(&format!(
            "You are {}. Backstory: {}. \
             Your personality you should always be: {}. \
             Your permitted actions are: {}. \
             Stay in character always.\n\n",
            profile.name, profile.backstory, profile.personality, profile.permitted_actions
        ));

        prompt.push_str("Here is the conversation so far:\n");
        prompt.push_str(&Self::render_chat_log(messages));
        prompt.push_str("\n\n");

        prompt.push_str(
            "Wrap anything you say out loud in double quotes. \
             Keep your reply to 3-4 sentences.",
        );

        prompt
    }

    /// Wraps the system prompt as the single system-role payload entry.
    pub fn build_turn_messages(system_prompt: String) -> Vec<PromptMessage> {
        vec![PromptMessage {
            role: PromptRole::System,
            content: system_prompt,
        }]
    }
}
