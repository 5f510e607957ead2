//! Integration tests for skill grouping (Window and Band modes).

use court_rotation_web::logic::{band_distance, Foursome, BAND_COUNT};
use court_rotation_web::{form_groups, skill_band, GroupingMode, Player, PlayerId, SkillRating};
use std::collections::{BTreeSet, HashSet};

fn with_skills(skills: &[u8]) -> Vec<Player> {
    skills
        .iter()
        .enumerate()
        .map(|(i, &s)| Player::new(format!("P{i}"), s))
        .collect()
}

fn skills_of(group: &Foursome) -> Vec<u8> {
    let mut s: Vec<u8> = group.iter().map(|p| p.rating()).collect();
    s.sort_unstable();
    s
}

fn id_sets(groups: &[Foursome]) -> BTreeSet<BTreeSet<PlayerId>> {
    groups
        .iter()
        .map(|g| g.iter().map(|p| p.id).collect())
        .collect()
}

fn assert_all_distinct(groups: &[Foursome]) {
    let mut seen = HashSet::new();
    for g in groups {
        for p in g {
            assert!(seen.insert(p.id), "player {} used twice", p.name);
        }
    }
}

#[test]
fn bands_cover_ratings_in_pairs() {
    let bands: Vec<u8> = (1..=10).map(|r| skill_band(SkillRating::new(r))).collect();
    assert_eq!(bands, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
    assert!(bands.iter().all(|&b| b < BAND_COUNT));
    assert_eq!(band_distance(SkillRating::new(1), SkillRating::new(10)), 4);
}

#[test]
fn wide_gap_widens_window_or_falls_back_to_one_foursome() {
    let playing = with_skills(&[8, 2, 9, 3]);
    let groups = form_groups(&playing, GroupingMode::Window, 1);
    assert_eq!(groups.len(), 1);
    assert_eq!(skills_of(&groups[0]), vec![2, 3, 8, 9]);
}

#[test]
fn window_keeps_close_ratings_together() {
    let playing = with_skills(&[10, 1, 9, 2, 1, 10, 2, 9]);
    let groups = form_groups(&playing, GroupingMode::Window, 2);
    assert_eq!(groups.len(), 2);
    assert_eq!(skills_of(&groups[0]), vec![1, 1, 2, 2]);
    assert_eq!(skills_of(&groups[1]), vec![9, 9, 10, 10]);
}

#[test]
fn band_mode_groups_same_band_first() {
    let playing = with_skills(&[5, 1, 6, 2, 5, 1, 6, 2]);
    let groups = form_groups(&playing, GroupingMode::Band, 2);
    assert_eq!(groups.len(), 2);
    assert_eq!(skills_of(&groups[0]), vec![1, 1, 2, 2]);
    assert_eq!(skills_of(&groups[1]), vec![5, 5, 6, 6]);
}

#[test]
fn band_mode_widens_when_bands_are_sparse() {
    let playing = with_skills(&[1, 3, 5, 7]);
    let groups = form_groups(&playing, GroupingMode::Band, 1);
    assert_eq!(groups.len(), 1);
    assert_eq!(skills_of(&groups[0]), vec![1, 3, 5, 7]);
}

#[test]
fn every_player_used_at_most_once() {
    let skills = [1, 7, 3, 3, 10, 2, 8, 5, 5, 6, 9, 4, 2, 7, 8, 1];
    for mode in [GroupingMode::Window, GroupingMode::Band] {
        let playing = with_skills(&skills);
        let groups = form_groups(&playing, mode, 4);
        assert_eq!(groups.len(), 4, "{:?}", mode);
        assert_all_distinct(&groups);
    }
}

#[test]
fn never_more_foursomes_than_courts() {
    let playing = with_skills(&[5; 12]);
    let groups = form_groups(&playing, GroupingMode::Window, 2);
    assert_eq!(groups.len(), 2);
    assert_all_distinct(&groups);
}

#[test]
fn under_four_players_gives_no_foursome() {
    let playing = with_skills(&[5, 5, 5]);
    assert!(form_groups(&playing, GroupingMode::Band, 1).is_empty());
}

#[test]
fn grouping_is_deterministic_and_order_independent() {
    let playing = with_skills(&[4, 4, 9, 1, 6, 6, 2, 8, 7, 3, 10, 5]);
    let mut reversed = playing.clone();
    reversed.reverse();
    for mode in [GroupingMode::Window, GroupingMode::Band] {
        let a = form_groups(&playing, mode, 3);
        let b = form_groups(&playing, mode, 3);
        let c = form_groups(&reversed, mode, 3);
        assert_eq!(id_sets(&a), id_sets(&b));
        assert_eq!(id_sets(&a), id_sets(&c));
    }
}
