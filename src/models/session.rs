//! SessionConfig, GroupingMode and SessionState (in-memory history owned by the orchestrator).

use crate::models::game::Round;
use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Rounds of teammate/opponent memory kept; older entries are trimmed.
pub const HISTORY_WINDOW_ROUNDS: u32 = 8;

pub const DEFAULT_ROUND_LENGTH_SECS: u32 = 720;
pub const MIN_ROUND_LENGTH_SECS: u32 = 180;
pub const MAX_ROUND_LENGTH_SECS: u32 = 2400;
pub const DEFAULT_WARN_SECS: u32 = 30;
pub const MIN_WARN_SECS: u32 = 5;
pub const MAX_WARN_SECS: u32 = 120;
pub const DEFAULT_MAX_COURTS: usize = 4;

/// How the group former decides which players are skill-compatible.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Dynamic rating tolerance around each seed, widened when too strict.
    #[default]
    Window,
    /// Fixed bands of width 2, widened by band distance when too strict.
    Band,
}

impl std::str::FromStr for GroupingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" => Ok(GroupingMode::Window),
            "band" => Ok(GroupingMode::Band),
            other => Err(format!("unknown grouping mode '{}'", other)),
        }
    }
}

/// Session configuration. Use `sanitized()` before handing it to the orchestrator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub round_length_secs: u32,
    pub warn_secs: u32,
    /// Upper bound on courts; the actual count also depends on who is present.
    pub max_courts: usize,
    pub grouping_mode: GroupingMode,
    /// Seed for tie-break randomness. None seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            round_length_secs: DEFAULT_ROUND_LENGTH_SECS,
            warn_secs: DEFAULT_WARN_SECS,
            max_courts: DEFAULT_MAX_COURTS,
            grouping_mode: GroupingMode::Window,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Clamp every option into its allowed range, logging each adjustment.
    pub fn sanitized(mut self) -> Self {
        let round = self
            .round_length_secs
            .clamp(MIN_ROUND_LENGTH_SECS, MAX_ROUND_LENGTH_SECS);
        if round != self.round_length_secs {
            log::warn!(
                "round_length_secs {} out of range, using {}",
                self.round_length_secs,
                round
            );
            self.round_length_secs = round;
        }
        let warn = self.warn_secs.clamp(MIN_WARN_SECS, MAX_WARN_SECS);
        if warn != self.warn_secs {
            log::warn!("warn_secs {} out of range, using {}", self.warn_secs, warn);
            self.warn_secs = warn;
        }
        if self.max_courts == 0 {
            log::warn!("max_courts must be at least 1, using 1");
            self.max_courts = 1;
        }
        self
    }

    /// Courts to fill for `present` players: never more than `max_courts`, never less than 1.
    pub fn courts_for(&self, present: usize) -> usize {
        (present / 4).min(self.max_courts).max(1)
    }
}

/// Unordered pair of player ids (smaller id first).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Values this session last assigned to a player's counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Emitted {
    bench_count: u32,
    last_played_round: u32,
}

/// Mutable session history. Created at session start, replaced on `End`/`Start`.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    /// Number of the most recent round (0 before the first).
    pub round_number: u32,
    /// Players benched in the immediately preceding round.
    pub last_benched: HashSet<PlayerId>,
    pub grouping_mode: GroupingMode,
    teammates: HashMap<PairKey, Vec<u32>>,
    opponents: HashMap<PairKey, Vec<u32>>,
    emitted: HashMap<PlayerId, Emitted>,
}

impl SessionState {
    pub fn new(grouping_mode: GroupingMode) -> Self {
        Self {
            grouping_mode,
            ..Self::default()
        }
    }

    /// Rounds (within the history window) in which `a` and `b` were teammates.
    pub fn times_teamed(&self, a: PlayerId, b: PlayerId) -> usize {
        self.teammates.get(&PairKey::new(a, b)).map_or(0, Vec::len)
    }

    /// Rounds (within the history window) in which `a` and `b` played against each other.
    pub fn times_opposed(&self, a: PlayerId, b: PlayerId) -> usize {
        self.opponents.get(&PairKey::new(a, b)).map_or(0, Vec::len)
    }

    /// Raise snapshot counters to what this session already emitted, so a
    /// persistence write that has not landed does not reset fairness.
    pub fn apply_overlay(&self, players: &mut [Player]) {
        for p in players.iter_mut() {
            if let Some(e) = self.emitted.get(&p.id) {
                p.bench_count = p.bench_count.max(e.bench_count);
                p.last_played_round = p.last_played_round.max(e.last_played_round);
            }
        }
    }

    /// Forget emitted counters (after an admin stats reset).
    pub fn clear_overlay(&mut self) {
        self.emitted.clear();
    }

    /// Record a freshly generated round: bump the round number, remember the
    /// bench set, append pair history and trim it to the window.
    ///
    /// Player counters in `round` must already reflect this round (benched
    /// players incremented, playing players stamped with the round number).
    pub fn record_round(&mut self, round: &Round) {
        self.round_number = round.number;
        self.last_benched = round.benched.iter().map(|p| p.id).collect();

        for m in &round.matches {
            for team in [&m.team_1, &m.team_2] {
                push_round(&mut self.teammates, PairKey::new(team[0].id, team[1].id), round.number);
            }
            for a in &m.team_1 {
                for b in &m.team_2 {
                    push_round(&mut self.opponents, PairKey::new(a.id, b.id), round.number);
                }
            }
            for p in m.team_1.iter().chain(m.team_2.iter()) {
                let e = self.emitted.entry(p.id).or_default();
                e.bench_count = e.bench_count.max(p.bench_count);
                e.last_played_round = e.last_played_round.max(p.last_played_round);
            }
        }
        for p in &round.benched {
            let e = self.emitted.entry(p.id).or_default();
            e.bench_count = e.bench_count.max(p.bench_count);
            e.last_played_round = e.last_played_round.max(p.last_played_round);
        }

        let oldest_kept = round.number.saturating_sub(HISTORY_WINDOW_ROUNDS - 1);
        trim(&mut self.teammates, oldest_kept);
        trim(&mut self.opponents, oldest_kept);
    }
}

fn push_round(history: &mut HashMap<PairKey, Vec<u32>>, key: PairKey, round: u32) {
    history.entry(key).or_default().push(round);
}

fn trim(history: &mut HashMap<PairKey, Vec<u32>>, oldest_kept: u32) {
    history.retain(|_, rounds| {
        rounds.retain(|&r| r >= oldest_kept);
        !rounds.is_empty()
    });
}
