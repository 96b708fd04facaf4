//! The conversation transcript: a bounded, ordered log of turns.

pub mod model;
pub mod repository;
pub mod store;

pub use model::Message;
pub use repository::TranscriptRepository;
pub use store::{DEFAULT_MAX_MESSAGES, TranscriptStore};
