//! Player and SkillRating data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Skill rating in the closed range 1..=10.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SkillRating(u8);

impl SkillRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Clamp any value into the valid range.
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for SkillRating {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for SkillRating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("skill rating {} outside {}..={}", value, Self::MIN, Self::MAX))
        }
    }
}

impl From<SkillRating> for u8 {
    fn from(s: SkillRating) -> u8 {
        s.0
    }
}

/// A player on the roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub skill: SkillRating,
    /// Checked in for this session.
    #[serde(default)]
    pub present: bool,
    /// Times benched this session.
    #[serde(default)]
    pub bench_count: u32,
    /// Round number of last appearance on a court (0 = never played).
    #[serde(default)]
    pub last_played_round: u32,
}

impl Player {
    /// Create a present player with the given name and skill. Counters start at zero.
    pub fn new(name: impl Into<String>, skill: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            skill: SkillRating::new(skill),
            present: true,
            bench_count: 0,
            last_played_round: 0,
        }
    }

    pub fn rating(&self) -> u8 {
        self.skill.value()
    }

    /// Record that this player sat out one round.
    pub fn record_benched(&mut self) {
        self.bench_count += 1;
    }

    /// Clear session stats (admin reset).
    pub fn reset_stats(&mut self) {
        self.bench_count = 0;
        self.last_played_round = 0;
    }
}
