//! Rotation logic: selection, grouping, balancing and the round state machine.

mod balance;
mod grouping;
mod orchestrator;
mod selection;
mod skill_band;

pub use balance::{balance_teams, split_penalty};
pub use grouping::{form_groups, Foursome, BAND_WINDOW_CEILING, WINDOW_CEILING, WINDOW_START};
pub use orchestrator::{RoundError, RoundOrchestrator, RoundPhase, TickOutcome};
pub use selection::{players_needed, select_players, Selection};
pub use skill_band::{band_distance, skill_band, BAND_COUNT};
