//! Court match (2v2) and Round.

use crate::models::player::{Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the net.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    #[default]
    One,
    Two,
}

/// A single 2v2 match on one court.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourtMatch {
    /// 1-based court index; 0 until the orchestrator places the match.
    pub court: usize,
    pub team_1: [Player; 2],
    pub team_2: [Player; 2],
    pub team_1_avg: f64,
    pub team_2_avg: f64,
    /// Balancing penalty of the chosen split (average gap plus homogeneity penalty).
    pub score: f64,
}

impl CourtMatch {
    pub fn on_court(mut self, court: usize) -> Self {
        self.court = court;
        self
    }

    pub fn team(&self, team: Team) -> &[Player; 2] {
        match team {
            Team::One => &self.team_1,
            Team::Two => &self.team_2,
        }
    }

    /// All four player ids, team 1 first.
    pub fn player_ids(&self) -> [PlayerId; 4] {
        [
            self.team_1[0].id,
            self.team_1[1].id,
            self.team_2[0].id,
            self.team_2[1].id,
        ]
    }
}

/// One generated round: a match per court and the players sitting out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub matches: Vec<CourtMatch>,
    pub benched: Vec<Player>,
    pub started_at: DateTime<Utc>,
}

impl Round {
    pub fn playing_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.matches.iter().flat_map(|m| m.player_ids())
    }
}
