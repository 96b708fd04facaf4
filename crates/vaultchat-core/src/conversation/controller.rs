//! Conversation controller.
//!
//! Orchestrates one logical conversation: accepts inbound messages, appends
//! them to the transcript, drives the AI turn when the sender is the player,
//! persists after every append, and notifies the render observer. Side
//! effects are strictly ordered: append, then persist, then notify.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::error::{Result, VaultError};
use crate::gateway::CompletionGateway;
use crate::observer::RenderObserver;
use crate::prompt::{PromptBuilder, StoryContext};
use crate::speaker::{SpeakerProfile, SpeakerRegistry};
use crate::transcript::{Message, TranscriptRepository, TranscriptStore};

/// The controller's turn state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Ready to accept a submission.
    Idle,
    /// A completion request is in flight; submissions are rejected.
    AwaitingCompletion,
}

/// Orchestrates a single conversation between the player and one NPC.
///
/// Constructed once with explicit dependencies and passed by reference to
/// the input and rendering layers; there is no ambient global instance.
///
/// Message ordering in the transcript is determined solely by append order,
/// which is serialized through this controller: at most one completion
/// request is in flight at a time, and a submit while one is pending is
/// rejected with [`VaultError::Busy`] rather than queued.
pub struct ConversationController {
    store: Mutex<TranscriptStore>,
    repository: Arc<dyn TranscriptRepository>,
    gateway: Arc<dyn CompletionGateway>,
    observer: Arc<dyn RenderObserver>,
    player: Arc<SpeakerProfile>,
    npc: Arc<SpeakerProfile>,
    story: StoryContext,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag when the turn ends, however it ends.
struct TurnGuard<'a>(&'a AtomicBool);

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConversationController {
    /// Creates a controller for one conversation.
    ///
    /// # Arguments
    ///
    /// * `store` - The bounded transcript log.
    /// * `repository` - Persistence backend for the transcript.
    /// * `gateway` - The completion provider boundary.
    /// * `observer` - The rendering surface to notify.
    /// * `player` - The designated human speaker; their submissions trigger
    ///   an AI turn.
    /// * `npc` - The profile AI replies are attributed to.
    /// * `story` - Scenario background baked into every system prompt.
    pub fn new(
        store: TranscriptStore,
        repository: Arc<dyn TranscriptRepository>,
        gateway: Arc<dyn CompletionGateway>,
        observer: Arc<dyn RenderObserver>,
        player: Arc<SpeakerProfile>,
        npc: Arc<SpeakerProfile>,
        story: StoryContext,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            repository,
            gateway,
            observer,
            player,
            npc,
            story,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The current turn state, for input-surface gating.
    pub fn state(&self) -> TurnState {
        if self.in_flight.load(Ordering::Acquire) {
            TurnState::AwaitingCompletion
        } else {
            TurnState::Idle
        }
    }

    /// The profile whose submissions trigger an AI turn.
    pub fn player(&self) -> &Arc<SpeakerProfile> {
        &self.player
    }

    /// The profile AI replies are attributed to.
    pub fn npc(&self) -> &Arc<SpeakerProfile> {
        &self.npc
    }

    /// An ordered snapshot of the current transcript.
    pub async fn messages(&self) -> Vec<Message> {
        self.store.lock().await.messages().cloned().collect()
    }

    /// Replaces the in-memory transcript from the repository.
    ///
    /// Intended for startup restore. Returns the number of loaded messages.
    ///
    /// # Errors
    ///
    /// Propagates repository errors; the in-memory transcript is left
    /// unchanged when the load fails.
    pub async fn load_history(&self, registry: &dyn SpeakerRegistry) -> Result<usize> {
        let messages = self.repository.load(registry).await?;
        let mut store = self.store.lock().await;
        store.replace(messages);
        Ok(store.len())
    }

    /// Accepts a new inbound message.
    ///
    /// When `speaker` is the designated player, the submission starts an AI
    /// turn: the message is appended, persisted, and notified, then a
    /// completion is requested and the reply appended the same way. Any
    /// other speaker is a scripted utterance: append, persist, notify, no
    /// gateway call.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Busy`] when a completion request is already in
    ///   flight; nothing is appended and no second request is issued.
    /// - [`VaultError::Gateway`] when the provider call fails; the player
    ///   message stays in the transcript, no reply is appended, and the
    ///   controller returns to idle.
    pub async fn submit(&self, text: &str, speaker: &Arc<SpeakerProfile>) -> Result<()> {
        // Claim the turn before touching the transcript so a concurrent
        // submit can never interleave appends.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(VaultError::Busy);
        }
        let _guard = TurnGuard(&self.in_flight);

        if speaker.name != self.player.name {
            self.append_and_persist(Message::new(speaker.clone(), text))
                .await;
            return Ok(());
        }

        self.append_and_persist(Message::new(self.player.clone(), text))
            .await;

        let system_prompt = {
            let mut store = self.store.lock().await;
            let snapshot = store.snapshot();
            PromptBuilder::build_system_prompt(&self.npc, &self.story, &snapshot)
        };
        let turn = PromptBuilder::build_turn_messages(system_prompt);

        match self.gateway.complete(&turn).await {
            Ok(reply) => {
                self.append_and_persist(Message::new(self.npc.clone(), reply.trim()))
                    .await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("completion request failed: {err}");
                self.observer.on_turn_failed(&err);
                Err(err)
            }
        }
    }

    /// Append, persist, notify - in that order.
    ///
    /// A persistence failure is logged and reported but does not suppress
    /// the appended-message notification: the in-memory transcript remains
    /// the source of truth for the session.
    async fn append_and_persist(&self, message: Message) {
        let snapshot = {
            let mut store = self.store.lock().await;
            store.append(message.clone());
            store.snapshot()
        };

        if let Err(err) = self.repository.save(&snapshot).await {
            tracing::warn!("failed to persist transcript: {err}");
            self.observer.on_persist_failed(&err);
        }

        self.observer.on_message_appended(&message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::speaker::InMemorySpeakerRegistry;

    // In-memory repository recording every save as (speaker, text) pairs.
    struct MockRepository {
        saves: StdMutex<Vec<Vec<(String, String)>>>,
        fail_saves: bool,
    }

    impl MockRepository {
        fn new() -> Self {
            Self {
                saves: StdMutex::new(Vec::new()),
                fail_saves: false,
            }
        }

        fn failing() -> Self {
            Self {
                saves: StdMutex::new(Vec::new()),
                fail_saves: true,
            }
        }

        fn last_save(&self) -> Vec<(String, String)> {
            self.saves.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl TranscriptRepository for MockRepository {
        async fn save(&self, messages: &[Message]) -> Result<()> {
            if self.fail_saves {
                return Err(VaultError::io("disk full"));
            }
            let pairs = messages
                .iter()
                .map(|m| (m.speaker_name().to_string(), m.raw_text.clone()))
                .collect();
            self.saves.lock().unwrap().push(pairs);
            Ok(())
        }

        async fn load(&self, _registry: &dyn SpeakerRegistry) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }
    }

    // Gateway returning a fixed reply, optionally parking until released.
    struct MockGateway {
        reply: Result<String>,
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
        park: bool,
    }

    impl MockGateway {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                entered: Notify::new(),
                release: Notify::new(),
                park: false,
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(VaultError::gateway("provider unavailable")),
                calls: AtomicUsize::new(0),
                entered: Notify::new(),
                release: Notify::new(),
                park: false,
            }
        }

        fn parked(reply: &str) -> Self {
            Self {
                park: true,
                ..Self::replying(reply)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionGateway for MockGateway {
        async fn complete(&self, _messages: &[crate::PromptMessage]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            if self.park {
                self.release.notified().await;
            }
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        appended: StdMutex<Vec<(String, String)>>,
        turn_failures: AtomicUsize,
        persist_failures: AtomicUsize,
    }

    impl RenderObserver for RecordingObserver {
        fn on_message_appended(&self, message: &Message) {
            self.appended
                .lock()
                .unwrap()
                .push((message.speaker_name().to_string(), message.raw_text.clone()));
        }

        fn on_turn_failed(&self, _error: &VaultError) {
            self.turn_failures.fetch_add(1, Ordering::SeqCst);
        }

        fn on_persist_failed(&self, _error: &VaultError) {
            self.persist_failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn profiles() -> (Arc<SpeakerProfile>, Arc<SpeakerProfile>) {
        (
            Arc::new(SpeakerProfile::new("YOU")),
            Arc::new(SpeakerProfile::new("Marcus")),
        )
    }

    fn controller(
        repository: Arc<MockRepository>,
        gateway: Arc<MockGateway>,
        observer: Arc<RecordingObserver>,
    ) -> ConversationController {
        let (player, npc) = profiles();
        ConversationController::new(
            TranscriptStore::default(),
            repository,
            gateway,
            observer,
            player,
            npc,
            StoryContext::default(),
        )
    }

    #[tokio::test]
    async fn player_submission_runs_a_full_turn() {
        let repository = Arc::new(MockRepository::new());
        let gateway = Arc::new(MockGateway::replying("Hello, survivor."));
        let observer = Arc::new(RecordingObserver::default());
        let controller = controller(repository.clone(), gateway.clone(), observer.clone());
        let player = controller.player().clone();

        controller.submit("Hi", &player).await.unwrap();

        // Human message appended, then the NPC reply, in order.
        let messages = controller.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].speaker_name(), "YOU");
        assert_eq!(messages[0].raw_text, "Hi");
        assert_eq!(messages[1].speaker_name(), "Marcus");
        assert_eq!(messages[1].raw_text, "Hello, survivor.");

        // The last persisted snapshot contains both entries in that order.
        assert_eq!(
            repository.last_save(),
            vec![
                ("YOU".to_string(), "Hi".to_string()),
                ("Marcus".to_string(), "Hello, survivor.".to_string()),
            ]
        );

        // Observer saw both appends in order.
        assert_eq!(observer.appended.lock().unwrap().len(), 2);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(controller.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn npc_submission_appends_without_a_gateway_call() {
        let repository = Arc::new(MockRepository::new());
        let gateway = Arc::new(MockGateway::replying("unused"));
        let observer = Arc::new(RecordingObserver::default());
        let controller = controller(repository.clone(), gateway.clone(), observer);
        let npc = controller.npc().clone();

        controller
            .submit("\"The generator is down again.\"", &npc)
            .await
            .unwrap();

        assert_eq!(controller.messages().await.len(), 1);
        assert_eq!(gateway.calls(), 0);
        assert_eq!(repository.last_save().len(), 1);
    }

    #[tokio::test]
    async fn submit_while_awaiting_completion_is_rejected() {
        let repository = Arc::new(MockRepository::new());
        let gateway = Arc::new(MockGateway::parked("Eventually."));
        let observer = Arc::new(RecordingObserver::default());
        let controller = Arc::new(controller(repository.clone(), gateway.clone(), observer));
        let player = controller.player().clone();

        let first = {
            let controller = controller.clone();
            let player = player.clone();
            tokio::spawn(async move { controller.submit("First", &player).await })
        };

        // Wait until the first turn is inside the gateway call.
        gateway.entered.notified().await;
        assert_eq!(controller.state(), TurnState::AwaitingCompletion);

        // The second submit is rejected synchronously; nothing appended,
        // no second gateway call.
        let rejected = controller.submit("Second", &player).await;
        assert!(matches!(rejected, Err(VaultError::Busy)));
        assert_eq!(controller.messages().await.len(), 1);
        assert_eq!(gateway.calls(), 1);

        gateway.release.notify_one();
        first.await.unwrap().unwrap();

        assert_eq!(controller.state(), TurnState::Idle);
        assert_eq!(controller.messages().await.len(), 2);
    }

    #[tokio::test]
    async fn gateway_failure_appends_nothing_and_reenables_submission() {
        let repository = Arc::new(MockRepository::new());
        let gateway = Arc::new(MockGateway::failing());
        let observer = Arc::new(RecordingObserver::default());
        let controller = controller(repository.clone(), gateway.clone(), observer.clone());
        let player = controller.player().clone();

        let err = controller.submit("Hi", &player).await.unwrap_err();
        assert!(matches!(err, VaultError::Gateway { .. }));

        // Only the player message made it in; the failure was surfaced.
        assert_eq!(controller.messages().await.len(), 1);
        assert_eq!(observer.turn_failures.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state(), TurnState::Idle);

        // Submission is re-enabled after the failure.
        let gateway_calls_before = gateway.calls();
        let _ = controller.submit("Are you there?", &player).await;
        assert_eq!(gateway.calls(), gateway_calls_before + 1);
    }

    #[tokio::test]
    async fn persist_failure_is_reported_but_does_not_suppress_notification() {
        let repository = Arc::new(MockRepository::failing());
        let gateway = Arc::new(MockGateway::replying("Still here."));
        let observer = Arc::new(RecordingObserver::default());
        let controller = controller(repository, gateway, observer.clone());
        let player = controller.player().clone();

        controller.submit("Hi", &player).await.unwrap();

        // Both appends were notified despite every save failing.
        assert_eq!(observer.appended.lock().unwrap().len(), 2);
        assert_eq!(observer.persist_failures.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn load_history_replaces_the_transcript() {
        struct PreloadedRepository;

        #[async_trait]
        impl TranscriptRepository for PreloadedRepository {
            async fn save(&self, _messages: &[Message]) -> Result<()> {
                Ok(())
            }

            async fn load(&self, registry: &dyn SpeakerRegistry) -> Result<Vec<Message>> {
                let marcus = registry
                    .resolve("Marcus")
                    .ok_or_else(|| VaultError::unknown_speaker("Marcus"))?;
                Ok(vec![Message::new(marcus, "\"Welcome back.\"")])
            }
        }

        let (player, npc) = profiles();
        let registry =
            InMemorySpeakerRegistry::from_profiles(vec![(*player).clone(), (*npc).clone()]);
        let controller = ConversationController::new(
            TranscriptStore::default(),
            Arc::new(PreloadedRepository),
            Arc::new(MockGateway::replying("unused")),
            Arc::new(RecordingObserver::default()),
            player,
            npc,
            StoryContext::default(),
        );

        let loaded = controller.load_history(&registry).await.unwrap();

        assert_eq!(loaded, 1);
        let messages = controller.messages().await;
        assert_eq!(messages[0].speaker_name(), "Marcus");
    }
}
