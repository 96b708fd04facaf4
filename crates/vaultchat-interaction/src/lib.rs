//! Completion gateway implementations.
//!
//! Concrete [`vaultchat_core::CompletionGateway`] backends: a direct REST
//! implementation for the OpenAI Chat Completions API, and a scripted
//! gateway for offline runs and tests.

pub mod openai_gateway;
pub mod scripted_gateway;

pub use openai_gateway::OpenAiGateway;
pub use scripted_gateway::ScriptedGateway;
