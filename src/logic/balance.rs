//! Team balancing: split a foursome into two pairs with the smallest skill imbalance.

use crate::logic::grouping::Foursome;
use crate::models::{CourtMatch, Player};

/// The three ways to split four players into two unordered pairs.
const SPLITS: [([usize; 2], [usize; 2]); 3] = [([0, 1], [2, 3]), ([0, 2], [1, 3]), ([0, 3], [1, 2])];

/// Extra penalty for two internally tight teams separated by a full point or more.
const HOMOGENEOUS_GAP_PENALTY: f64 = 1.0;

fn average(team: &[&Player; 2]) -> f64 {
    (team[0].rating() as f64 + team[1].rating() as f64) / 2.0
}

fn spread(team: &[&Player; 2]) -> u8 {
    team[0].rating().abs_diff(team[1].rating())
}

/// Penalty of pairing `a` against `b`: the average gap, plus a fixed penalty for
/// "both high vs both low" splits.
pub fn split_penalty(a: &[&Player; 2], b: &[&Player; 2]) -> f64 {
    let diff = (average(a) - average(b)).abs();
    if spread(a) <= 2 && spread(b) <= 2 && diff >= 1.0 {
        diff + HOMOGENEOUS_GAP_PENALTY
    } else {
        diff
    }
}

/// Pick the split with the lowest penalty. The court index is left at 0.
///
/// Players are put in (skill, id) order first, so any permutation of the same
/// foursome yields the same teams and score; exact ties go to the first split.
pub fn balance_teams(foursome: &Foursome) -> CourtMatch {
    let mut ordered: Vec<&Player> = foursome.iter().collect();
    ordered.sort_by(|a, b| a.skill.cmp(&b.skill).then(a.id.cmp(&b.id)));

    let split = |(ia, ib): ([usize; 2], [usize; 2])| (ia.map(|i| ordered[i]), ib.map(|i| ordered[i]));
    let (mut a, mut b) = split(SPLITS[0]);
    let mut score = split_penalty(&a, &b);
    for candidate in &SPLITS[1..] {
        let (ca, cb) = split(*candidate);
        let penalty = split_penalty(&ca, &cb);
        if penalty < score {
            (a, b, score) = (ca, cb, penalty);
        }
    }

    CourtMatch {
        court: 0,
        team_1_avg: average(&a),
        team_2_avg: average(&b),
        team_1: a.map(Player::clone),
        team_2: b.map(Player::clone),
        score,
    }
}
