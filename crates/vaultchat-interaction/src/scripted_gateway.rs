//! ScriptedGateway - canned replies for offline runs and tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use vaultchat_core::{CompletionGateway, PromptMessage, Result};

const FALLBACK_REPLY: &str =
    "\"The vault radio only crackles. Ask me again when the power is back.\"";

/// A gateway that replays a fixed script of replies in order.
///
/// Once the script runs out it keeps answering with a fallback line, so a
/// demo session never dead-ends.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ScriptedGateway {
    /// Creates a gateway replaying `replies` in order.
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: FALLBACK_REPLY.to_string(),
        }
    }

    /// Overrides the reply used once the script is exhausted.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, _messages: &[PromptMessage]) -> Result<String> {
        let next = self.replies.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_the_script_in_order_then_falls_back() {
        let gateway = ScriptedGateway::new(vec![
            "\"Hello there.\"".to_string(),
            "\"Keep your voice down.\"".to_string(),
        ])
        .with_fallback("\"...\"".to_string());

        assert_eq!(gateway.complete(&[]).await.unwrap(), "\"Hello there.\"");
        assert_eq!(
            gateway.complete(&[]).await.unwrap(),
            "\"Keep your voice down.\""
        );
        assert_eq!(gateway.complete(&[]).await.unwrap(), "\"...\"");
        assert_eq!(gateway.complete(&[]).await.unwrap(), "\"...\"");
    }
}
