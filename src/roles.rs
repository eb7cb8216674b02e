//! The three conversational roles
//!
//! The director derives a per-turn objective, the victim is the stateful
//! persona, the moderator filters audience proposals into a ballot.

mod director;
mod history;
mod moderator;
mod victim;

pub use director::{Director, DEFAULT_OBJECTIVE};
pub use history::{ConversationHistory, MAX_EXCHANGES};
pub use moderator::{Moderator, FILLER_CHOICE};
pub use victim::{Victim, APOLOGY_REPLY, PROTOCOL_FALLBACK_REPLY};
