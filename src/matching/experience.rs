use crate::job::ExperienceLevel;

/// Score for unknown years of experience.
pub const UNKNOWN_EXPERIENCE_SCORE: u8 = 50;

/// Years vs the level's band: inside ⇒ 100; under ⇒ −20 per missing year;
/// over ⇒ −5 per extra year, floored at 60.
pub fn experience_score(years: Option<f32>, level: ExperienceLevel) -> u8 {
    let Some(years) = years.filter(|y| y.is_finite()) else {
        return UNKNOWN_EXPERIENCE_SCORE;
    };
    let years = years.max(0.0);
    let (lo, hi) = level.year_band();
    let score = if years < lo {
        (100.0 - 20.0 * (lo - years)).max(0.0)
    } else if years > hi {
        (100.0 - 5.0 * (years - hi)).max(60.0)
    } else {
        100.0
    };
    score.round().clamp(0.0, 100.0) as u8
}
