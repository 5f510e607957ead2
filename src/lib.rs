//! Court rotation web app: library with models, rotation logic and external boundaries.

pub mod boundary;
pub mod logic;
pub mod models;
pub mod ticker;

pub use boundary::{
    AdminGate, BatchWriter, InMemoryRoster, PlayerFields, PlayerUpdate, RosterStore, StoreError,
    ToneEmitter,
};
pub use logic::{
    balance_teams, form_groups, select_players, skill_band, RoundError, RoundOrchestrator,
    RoundPhase, Selection, TickOutcome,
};
pub use models::{
    CourtMatch, GroupingMode, Player, PlayerId, Round, SessionConfig, SessionState, SkillRating,
    Team,
};
