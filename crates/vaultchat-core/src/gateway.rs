//! Completion gateway trait.
//!
//! The abstract boundary to the language-model provider. Provider selection,
//! authentication, and model identifiers are configuration of the concrete
//! implementation, not of this seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::prompt::PromptMessage;

/// Boundary to the language-model provider.
///
/// Implementations should enforce a bounded timeout themselves and surface
/// it as a [`crate::VaultError::Gateway`] failure; the conversation
/// controller does not cancel in-flight requests.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Requests a completion for the given payload and returns the reply
    /// text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::VaultError::Gateway`] when the provider call fails
    /// or times out.
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String>;
}
