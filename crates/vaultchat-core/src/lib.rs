//! Core conversation/message pipeline for the vault chat.
//!
//! This crate owns the transcript (a bounded, ordered log of turns), the
//! prompt derivation for each AI turn, and the controller that orchestrates
//! a player submission into an NPC reply. Rendering surfaces and the actual
//! LLM provider live behind the [`observer::RenderObserver`] and
//! [`gateway::CompletionGateway`] seams.

pub mod conversation;
pub mod error;
pub mod gateway;
pub mod observer;
pub mod prompt;
pub mod speaker;
pub mod transcript;

pub use conversation::{ConversationController, TurnState};
pub use error::{Result, VaultError};
pub use gateway::CompletionGateway;
pub use observer::RenderObserver;
pub use prompt::{DailyLog, PromptBuilder, PromptMessage, PromptRole, StoryContext};
pub use speaker::{InMemorySpeakerRegistry, SpeakerProfile, SpeakerRegistry};
pub use transcript::{Message, TranscriptRepository, TranscriptStore, DEFAULT_MAX_MESSAGES};
