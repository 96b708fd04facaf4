//! Render observer trait.
//!
//! The capability the core exposes to whatever surface is displaying the
//! conversation. The core pushes notifications; the surface decides how to
//! draw them.

use crate::error::VaultError;
use crate::transcript::Message;

/// Observer of conversation side effects.
///
/// `on_message_appended` fires exactly once per successful append, in
/// append order, after persistence completed or its failure was reported.
pub trait RenderObserver: Send + Sync {
    /// A message was appended to the transcript.
    fn on_message_appended(&self, message: &Message);

    /// The AI turn did not complete; nothing was appended for it.
    fn on_turn_failed(&self, _error: &VaultError) {}

    /// The transcript could not be persisted. The in-memory transcript is
    /// unaffected and the conversation continues.
    fn on_persist_failed(&self, _error: &VaultError) {}
}
