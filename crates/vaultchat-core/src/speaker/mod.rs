//! Speaker identity and resolution.

pub mod model;
pub mod registry;

pub use model::SpeakerProfile;
pub use registry::{InMemorySpeakerRegistry, SpeakerRegistry};
