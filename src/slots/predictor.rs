//! Bonus prediction drawn at random for a screenshot

use rand::Rng;
use std::ops::RangeInclusive;

pub const SPINS_RANGE: RangeInclusive<u32> = 20..=150;
pub const CONFIDENCE_RANGE: RangeInclusive<u32> = 65..=97;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusPrediction {
    pub spins_until_bonus: u32,
    pub confidence_percent: u32,
}

/// Draw a prediction; the screenshot content plays no part in it
pub fn predict_bonus<R: Rng + ?Sized>(rng: &mut R) -> BonusPrediction {
    BonusPrediction {
        spins_until_bonus: rng.gen_range(SPINS_RANGE),
        confidence_percent: rng.gen_range(CONFIDENCE_RANGE),
    }
}
