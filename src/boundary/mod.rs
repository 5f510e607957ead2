//! External collaborators: roster store, persistence batching, admin gate, tone cues.

mod admin;
mod persist;
mod roster;
mod tone;

pub use admin::{AdminGate, PasswordGate};
pub use persist::{
    persist_in_chunks, BackgroundWriter, BatchWriter, ImmediateWriter, PersistenceReport,
    PERSIST_CHUNK_SIZE,
};
pub use roster::{parse_csv_players, InMemoryRoster, PlayerFields, PlayerUpdate, RosterStore};
pub use tone::{Cue, CueBoard, LogToneEmitter, ToneEmitter, END_TONE, WARNING_TONE};

use crate::models::PlayerId;

/// Errors raised at the I/O boundary. Scheduling never produces these itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// Malformed update payload (missing id, no fields, bad value).
    Validation(String),
    /// No player with this id.
    NotFound(PlayerId),
    /// Missing credentials, endpoint or source file for a boundary.
    Configuration(String),
    /// The backend rejected or failed the operation.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "Invalid update: {}", msg),
            StoreError::NotFound(id) => write!(f, "Player {} not found", id),
            StoreError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            StoreError::Backend(msg) => write!(f, "Roster store error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
