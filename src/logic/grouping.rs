//! Skill grouping: partition the playing players into foursomes of comparable skill.
//!
//! Both modes run the same seed-based greedy pass over an immutable sorted snapshot,
//! tracking consumed players with a `used` mask. Each player is taken at most once,
//! so foursomes never share a player. When a pass cannot fill every court the
//! tolerance widens and the pass restarts from scratch; past the ceiling the
//! sorted list is chunked in order.

use crate::logic::skill_band::band_distance;
use crate::models::{GroupingMode, Player};

/// Exactly four distinct players sharing a court.
pub type Foursome = [Player; 4];

/// Starting rating window for `GroupingMode::Window`.
pub const WINDOW_START: u8 = 2;
/// Widest rating window tried before falling back to chunking.
pub const WINDOW_CEILING: u8 = 5;
/// Widest band distance tried for `GroupingMode::Band`.
pub const BAND_WINDOW_CEILING: u8 = 4;

/// Group `playing` into at most `courts` foursomes.
pub fn form_groups(playing: &[Player], mode: GroupingMode, courts: usize) -> Vec<Foursome> {
    let mut sorted: Vec<&Player> = playing.iter().collect();
    sorted.sort_by(|a, b| a.skill.cmp(&b.skill).then(a.id.cmp(&b.id)));
    sorted.dedup_by_key(|p| p.id);

    let target = courts.min(sorted.len() / 4);
    if target == 0 {
        return Vec::new();
    }

    let (start, ceiling) = match mode {
        GroupingMode::Window => (WINDOW_START, WINDOW_CEILING),
        GroupingMode::Band => (0, BAND_WINDOW_CEILING),
    };
    for tolerance in start..=ceiling {
        let compatible = |seed: &Player, other: &Player| match mode {
            GroupingMode::Window => seed.rating().abs_diff(other.rating()) <= tolerance,
            GroupingMode::Band => band_distance(seed.skill, other.skill) <= tolerance,
        };
        if let Some(groups) = greedy_pass(&sorted, target, compatible) {
            log::debug!(
                "grouping {:?}: {} foursome(s) at tolerance {}",
                mode,
                groups.len(),
                tolerance
            );
            return groups;
        }
    }

    log::debug!("grouping {:?}: falling back to sorted chunks", mode);
    sorted
        .chunks_exact(4)
        .take(target)
        .map(|c| [c[0].clone(), c[1].clone(), c[2].clone(), c[3].clone()])
        .collect()
}

/// One greedy pass. Returns `None` unless `target` foursomes are formed.
fn greedy_pass<F>(sorted: &[&Player], target: usize, compatible: F) -> Option<Vec<Foursome>>
where
    F: Fn(&Player, &Player) -> bool,
{
    let mut used = vec![false; sorted.len()];
    let mut groups = Vec::with_capacity(target);

    for seed in 0..sorted.len() {
        if groups.len() == target {
            break;
        }
        if used[seed] {
            continue;
        }
        let mut candidates: Vec<usize> = (0..sorted.len())
            .filter(|&j| j != seed && !used[j] && compatible(sorted[seed], sorted[j]))
            .collect();
        // Nearest sorted positions first; the lower index wins a distance tie.
        candidates.sort_by_key(|&j| (j.abs_diff(seed), j));
        if candidates.len() < 3 {
            continue;
        }
        let mut members = [seed, candidates[0], candidates[1], candidates[2]];
        members.sort_unstable();
        for &m in &members {
            used[m] = true;
        }
        groups.push(members.map(|m| sorted[m].clone()));
    }

    (groups.len() == target).then_some(groups)
}
