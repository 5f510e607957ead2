//! Round state machine: owns the countdown, the session history and the
//! select → group → balance pipeline that runs on every round boundary.

use crate::boundary::{
    BatchWriter, PlayerUpdate, RosterStore, StoreError, ToneEmitter, END_TONE, WARNING_TONE,
};
use crate::logic::balance::balance_teams;
use crate::logic::grouping::form_groups;
use crate::logic::selection::{select_players, Selection};
use crate::models::{CourtMatch, GroupingMode, Player, Round, SessionConfig, SessionState};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the session is in its round lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// No round active, timer stopped.
    #[default]
    Idle,
    /// Timer counting down.
    RoundActive,
    /// Timer frozen; the round's matches are still current.
    Paused,
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundPhase::Idle => write!(f, "idle"),
            RoundPhase::RoundActive => write!(f, "round active"),
            RoundPhase::Paused => write!(f, "paused"),
        }
    }
}

/// Errors reported by the orchestrator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoundError {
    /// Too few present players to fill a court. The phase is unchanged.
    CannotGenerateRound { present: usize },
    /// Event not allowed in the current phase.
    InvalidState {
        phase: RoundPhase,
        event: &'static str,
    },
    /// The roster could not be read.
    Store(StoreError),
}

impl std::fmt::Display for RoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundError::CannotGenerateRound { present } => write!(
                f,
                "Cannot generate round: need at least 4 present players (have {})",
                present
            ),
            RoundError::InvalidState { phase, event } => {
                write!(f, "Cannot {} while {}", event, phase)
            }
            RoundError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RoundError {}

impl From<StoreError> for RoundError {
    fn from(e: StoreError) -> Self {
        RoundError::Store(e)
    }
}

/// Result of one timer tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// Tick from a cancelled timer, or no round is running. The ticker should stop.
    Stale,
    /// Paused; nothing changed.
    Frozen { remaining: u32 },
    Counting { remaining: u32 },
    /// The warning cue sounded.
    Warned { remaining: u32 },
    /// The timer expired and the next round started.
    Advanced { round: u32 },
    /// The timer expired but no round could be generated; retried next tick.
    Stalled,
}

/// Drives rounds for one session. All events take `&mut self`, so a host that
/// shares it behind a mutex gets tick / generation mutual exclusion for free.
pub struct RoundOrchestrator {
    config: SessionConfig,
    phase: RoundPhase,
    state: SessionState,
    current: Option<Round>,
    remaining_secs: u32,
    /// Bumped by `start` and `end`; ticks carrying an older epoch are ignored.
    epoch: u64,
    rng: StdRng,
    roster: Arc<dyn RosterStore>,
    writer: Arc<dyn BatchWriter>,
    tone: Arc<dyn ToneEmitter>,
}

fn rng_for(config: &SessionConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl RoundOrchestrator {
    /// The config is used as given; clamp it with `SessionConfig::sanitized` at the input boundary.
    pub fn new(
        config: SessionConfig,
        roster: Arc<dyn RosterStore>,
        writer: Arc<dyn BatchWriter>,
        tone: Arc<dyn ToneEmitter>,
    ) -> Self {
        Self {
            rng: rng_for(&config),
            state: SessionState::new(config.grouping_mode),
            config,
            phase: RoundPhase::Idle,
            current: None,
            remaining_secs: 0,
            epoch: 0,
            roster,
            writer,
            tone,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current.as_ref()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.state
    }

    /// Replace the config. Round length applies from the next round; the
    /// grouping mode from the next generation.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.state.grouping_mode = config.grouping_mode;
        self.config = config;
    }

    pub fn set_grouping_mode(&mut self, mode: GroupingMode) {
        self.config.grouping_mode = mode;
        self.state.grouping_mode = mode;
    }

    /// Forget in-session counters after the roster stats were reset.
    pub fn clear_overlay(&mut self) {
        self.state.clear_overlay();
    }

    /// Begin a fresh session at round 1. Any running timer becomes stale.
    /// On failure the orchestrator is left `Idle`.
    pub fn start(&mut self) -> Result<&Round, RoundError> {
        self.reset();
        self.rng = rng_for(&self.config);
        self.complete_round()
    }

    pub fn pause(&mut self) -> Result<(), RoundError> {
        if self.phase != RoundPhase::RoundActive {
            return Err(RoundError::InvalidState {
                phase: self.phase,
                event: "pause",
            });
        }
        self.phase = RoundPhase::Paused;
        Ok(())
    }

    /// Continue with the time that was left when paused.
    pub fn resume(&mut self) -> Result<(), RoundError> {
        if self.phase != RoundPhase::Paused {
            return Err(RoundError::InvalidState {
                phase: self.phase,
                event: "resume",
            });
        }
        self.phase = RoundPhase::RoundActive;
        Ok(())
    }

    /// Stop the session: clears matches and the round counter. Valid in any phase.
    pub fn end(&mut self) {
        self.reset();
        log::info!("Session ended");
    }

    /// Skip the rest of this round. On failure the phase is unchanged.
    pub fn manual_next(&mut self) -> Result<&Round, RoundError> {
        if self.phase == RoundPhase::Idle {
            return Err(RoundError::InvalidState {
                phase: self.phase,
                event: "advance",
            });
        }
        self.complete_round()
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if epoch != self.epoch || self.phase == RoundPhase::Idle {
            return TickOutcome::Stale;
        }
        if self.phase == RoundPhase::Paused {
            return TickOutcome::Frozen {
                remaining: self.remaining_secs,
            };
        }
        if self.remaining_secs == 0 {
            return self.complete_from_timer();
        }

        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            self.tone.emit(END_TONE.frequency_hz, END_TONE.duration_ms);
            return self.complete_from_timer();
        }
        if self.remaining_secs == self.config.warn_secs {
            self.tone.emit(WARNING_TONE.frequency_hz, WARNING_TONE.duration_ms);
            return TickOutcome::Warned {
                remaining: self.remaining_secs,
            };
        }
        TickOutcome::Counting {
            remaining: self.remaining_secs,
        }
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.phase = RoundPhase::Idle;
        self.current = None;
        self.remaining_secs = 0;
        self.state = SessionState::new(self.config.grouping_mode);
    }

    fn complete_from_timer(&mut self) -> TickOutcome {
        let outcome = self.complete_round().map(|r| r.number);
        match outcome {
            Ok(round) => TickOutcome::Advanced { round },
            Err(e) => {
                log::debug!("Round {} not replaced: {}", self.state.round_number, e);
                TickOutcome::Stalled
            }
        }
    }

    /// Generate the next round and re-arm the timer.
    fn complete_round(&mut self) -> Result<&Round, RoundError> {
        let round = self.generate_round()?;
        self.remaining_secs = self.config.round_length_secs;
        self.phase = RoundPhase::RoundActive;
        let round: &Round = self.current.insert(round);
        Ok(round)
    }

    fn generate_round(&mut self) -> Result<Round, RoundError> {
        let mut present: Vec<Player> = self
            .roster
            .list()?
            .into_iter()
            .filter(|p| p.present)
            .collect();
        self.state.apply_overlay(&mut present);

        let courts = self.config.courts_for(present.len());
        let number = self.state.round_number + 1;
        let Selection {
            mut playing,
            mut benched,
        } = select_players(&present, number, &self.state.last_benched, courts, &mut self.rng);
        if playing.is_empty() {
            log::warn!(
                "Cannot generate round {}: only {} present player(s)",
                number,
                present.len()
            );
            return Err(RoundError::CannotGenerateRound {
                present: present.len(),
            });
        }

        for p in &mut playing {
            p.last_played_round = number;
        }
        for p in &mut benched {
            p.record_benched();
        }

        let matches: Vec<CourtMatch> = form_groups(&playing, self.state.grouping_mode, courts)
            .iter()
            .enumerate()
            .map(|(i, four)| balance_teams(four).on_court(i + 1))
            .collect();

        let updates: Vec<PlayerUpdate> = benched
            .iter()
            .map(|p| PlayerUpdate::benched(p.id, p.bench_count))
            .chain(playing.iter().map(|p| PlayerUpdate::played(p.id, number)))
            .collect();

        let round = Round {
            number,
            matches,
            benched,
            started_at: Utc::now(),
        };
        self.state.record_round(&round);
        self.writer.submit(updates);

        log::info!(
            "Round {}: {} court(s), {} benched",
            number,
            round.matches.len(),
            round.benched.len()
        );
        Ok(round)
    }
}
