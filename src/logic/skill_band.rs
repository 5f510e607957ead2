//! Coarse skill bands: [1,2], [3,4], [5,6], [7,8], [9,10].

use crate::models::SkillRating;

/// Number of bands covering ratings 1..=10.
pub const BAND_COUNT: u8 = 5;

/// Band index (0-based) of a rating.
pub fn skill_band(rating: SkillRating) -> u8 {
    (rating.value() - 1) / 2
}

/// Distance between the bands of two ratings.
pub fn band_distance(a: SkillRating, b: SkillRating) -> u8 {
    skill_band(a).abs_diff(skill_band(b))
}
