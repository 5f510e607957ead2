//! Fairness-based selection: who plays this round and who sits out.

use crate::models::{Player, PlayerId};
use rand::Rng;
use std::collections::HashSet;

/// Players selected to play and players benched. Together they partition the present roster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub playing: Vec<Player>,
    pub benched: Vec<Player>,
}

/// Number of players that take a court: a multiple of 4, capped by court capacity.
pub fn players_needed(present: usize, courts: usize) -> usize {
    if present < 4 {
        return 0;
    }
    (present - present % 4).min(courts.max(1) * 4)
}

/// Choose who plays round `round_number`.
///
/// 1. De-duplicate by id (first occurrence wins).
/// 2. Rank for play: higher `bench_count`, then lower `last_played_round`, then a random tiebreak from `rng`.
/// 3. Bench from the bottom of the ranking, so nobody with a bench count above the minimum sits out
///    while a lower-count player plays, unless the quota forces it.
/// 4. Swap players benched last round with an equally-ranked (same bench count) player who played.
///
/// Fewer than 4 present players is a normal outcome: `playing` is empty and everyone is benched.
pub fn select_players<R: Rng + ?Sized>(
    present: &[Player],
    round_number: u32,
    last_benched: &HashSet<PlayerId>,
    courts: usize,
    rng: &mut R,
) -> Selection {
    let mut seen = HashSet::new();
    let unique: Vec<Player> = present
        .iter()
        .filter(|p| seen.insert(p.id))
        .cloned()
        .collect();

    let need = players_needed(unique.len(), courts);
    if need == 0 {
        return Selection {
            playing: Vec::new(),
            benched: unique,
        };
    }

    let mut ranked: Vec<(Player, u32)> = unique.into_iter().map(|p| (p, rng.gen())).collect();
    ranked.sort_by(|(a, a_tie), (b, b_tie)| {
        b.bench_count
            .cmp(&a.bench_count)
            .then(a.last_played_round.cmp(&b.last_played_round))
            .then(a_tie.cmp(b_tie))
    });
    let mut ranked: Vec<Player> = ranked.into_iter().map(|(p, _)| p).collect();

    let mut benched = ranked.split_off(need);
    let mut playing = ranked;

    avoid_consecutive_bench(&mut playing, &mut benched, last_benched);
    log::debug!(
        "Round {}: {} playing, {} benched",
        round_number,
        playing.len(),
        benched.len()
    );

    Selection { playing, benched }
}

/// Best-effort swap of repeat benchers. Only swaps equal bench counts, so the
/// bench-count multiset of each side is unchanged and the fairness guard holds.
fn avoid_consecutive_bench(
    playing: &mut [Player],
    benched: &mut [Player],
    last_benched: &HashSet<PlayerId>,
) {
    if last_benched.is_empty() {
        return;
    }
    for b in 0..benched.len() {
        if !last_benched.contains(&benched[b].id) {
            continue;
        }
        // Lowest-ranked eligible player first: they were next in line to sit out.
        let swap_with = (0..playing.len()).rev().find(|&i| {
            !last_benched.contains(&playing[i].id)
                && playing[i].bench_count == benched[b].bench_count
        });
        if let Some(i) = swap_with {
            std::mem::swap(&mut playing[i], &mut benched[b]);
        }
    }
}
