//! Data structures for court rotation: players, matches, rounds, session state.

mod game;
mod player;
mod session;

pub use game::{CourtMatch, Round, Team};
pub use player::{Player, PlayerId, SkillRating};
pub use session::{
    GroupingMode, PairKey, SessionConfig, SessionState, DEFAULT_MAX_COURTS,
    DEFAULT_ROUND_LENGTH_SECS, DEFAULT_WARN_SECS, HISTORY_WINDOW_ROUNDS, MAX_ROUND_LENGTH_SECS,
    MAX_WARN_SECS, MIN_ROUND_LENGTH_SECS, MIN_WARN_SECS,
};
