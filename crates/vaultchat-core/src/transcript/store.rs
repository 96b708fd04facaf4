//! In-memory bounded transcript log.

use std::collections::VecDeque;

use super::model::Message;

/// Default retention cap for the transcript.
pub const DEFAULT_MAX_MESSAGES: usize = 30;

/// Append-only, capacity-bounded ordered log of messages.
///
/// Insertion order defines conversation chronology. After every mutation
/// `len() <= max_messages` holds; on overflow the oldest message is evicted
/// first (FIFO), never reordered. The fixed-size retention bounds both
/// memory and the prompt the builder derives from the log.
#[derive(Debug)]
pub struct TranscriptStore {
    messages: VecDeque<Message>,
    max_messages: usize,
    dirty: bool,
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl TranscriptStore {
    /// Creates an empty store retaining at most `max_messages` entries.
    ///
    /// A cap of zero is clamped to one so the log can always hold the turn
    /// being appended.
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_messages: max_messages.max(1),
            dirty: false,
        }
    }

    /// Appends a message, evicting the oldest entry first when at capacity.
    ///
    /// Marks the store dirty.
    pub fn append(&mut self, message: Message) {
        if self.messages.len() >= self.max_messages {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
        self.dirty = true;
    }

    /// Replaces the whole transcript (history reload).
    ///
    /// Enforces the capacity invariant by keeping only the most recent
    /// `max_messages` entries, and leaves the store clean: a freshly loaded
    /// transcript has nothing new to persist.
    pub fn replace(&mut self, messages: Vec<Message>) {
        let mut messages: VecDeque<Message> = messages.into();
        while messages.len() > self.max_messages {
            messages.pop_front();
        }
        self.messages = messages;
        self.dirty = false;
    }

    /// Iterates the messages in chronological order. No side effects.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Clones the transcript into an ordered snapshot and marks the store
    /// clean. Used to hand a stable view to the persistence layer.
    pub fn snapshot(&mut self) -> Vec<Message> {
        self.dirty = false;
        self.messages.iter().cloned().collect()
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when no messages are retained.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The retention cap.
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// True when the log changed since the last snapshot.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
