/*
 *  clouds.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	Cloud coverage to animated cloud parameters
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use rand::Rng;
use std::ops::{Range, RangeInclusive};

/// Vertical offset, percent of the view height.
pub const TOP_PERCENT: RangeInclusive<u8> = 2..=90;
/// Drift animation duration, seconds.
pub const SPEED_SECS: RangeInclusive<u8> = 15..=40;

/// Ceiling on random draws per field, the top of the valid coverage range.
pub const MAX_DRAWS: i64 = 100;

const NORMAL_SCALE: Range<f64> = 0.4..1.0;
const FALLBACK_SCALE: Range<f64> = 40.0..200.0;

/// One entry of the coverage table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageBand {
    pub lower: i64,
    pub upper: i64,
    pub upper_inclusive: bool,
    pub rendered: usize,
    pub scale: Range<f64>,
}

impl CoverageBand {
    fn contains(&self, coverage: i64) -> bool {
        coverage >= self.lower
            && if self.upper_inclusive { coverage <= self.upper } else { coverage < self.upper }
    }
}

pub static COVERAGE_BANDS: [CoverageBand; 5] = [
    CoverageBand { lower: 0, upper: 20, upper_inclusive: false, rendered: 4, scale: NORMAL_SCALE },
    CoverageBand { lower: 20, upper: 40, upper_inclusive: false, rendered: 8, scale: NORMAL_SCALE },
    CoverageBand { lower: 40, upper: 60, upper_inclusive: false, rendered: 12, scale: NORMAL_SCALE },
    CoverageBand { lower: 60, upper: 80, upper_inclusive: false, rendered: 15, scale: NORMAL_SCALE },
    CoverageBand { lower: 80, upper: 100, upper_inclusive: true, rendered: 15, scale: NORMAL_SCALE },
];

/// Anything outside 0..=100 lands here.
pub static FALLBACK_BAND: CoverageBand =
    CoverageBand { lower: i64::MIN, upper: i64::MAX, upper_inclusive: true, rendered: 6, scale: FALLBACK_SCALE };

pub fn band_for(coverage: i64) -> &'static CoverageBand {
    COVERAGE_BANDS
        .iter()
        .find(|b| b.contains(coverage))
        .unwrap_or(&FALLBACK_BAND)
}

/// Per-snapshot cloud parameters. The three sequences run in parallel,
/// one entry per raw coverage unit; only the first `rendered` are drawn.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CloudField {
    pub rendered: usize,
    pub scale: Vec<f64>,
    pub top: Vec<u8>,
    pub speed: Vec<u8>,
}

/// A single cloud as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudSprite {
    pub scale: f64,
    pub top_pct: u8,
    pub duration_secs: u8,
}

impl CloudField {
    /// Number of underlying random draws.
    pub fn draws(&self) -> usize {
        self.scale.len()
    }

    /// Clouds that actually get drawn: `rendered` capped by the draws made.
    pub fn sprites(&self) -> impl Iterator<Item = CloudSprite> + '_ {
        self.scale
            .iter()
            .zip(self.top.iter())
            .zip(self.speed.iter())
            .take(self.rendered)
            .map(|((&scale, &top_pct), &duration_secs)| CloudSprite { scale, top_pct, duration_secs })
    }
}

/// Generates a fresh field from thread-local randomness. Repeated calls differ.
pub fn generate(coverage: i64) -> CloudField {
    generate_with(coverage, &mut rand::rng())
}

pub fn generate_with<R: Rng>(coverage: i64, rng: &mut R) -> CloudField {
    let band = band_for(coverage);
    // one draw per coverage unit, not per rendered cloud
    let draws = coverage.clamp(0, MAX_DRAWS) as usize;

    let scale = (0..draws).map(|_| rng.random_range(band.scale.clone())).collect();
    let top = (0..draws).map(|_| rng.random_range(TOP_PERCENT)).collect();
    let speed = (0..draws).map(|_| rng.random_range(SPEED_SECS)).collect();

    CloudField { rendered: band.rendered, scale, top, speed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_ranges(field: &CloudField) {
        assert_eq!(field.scale.len(), field.top.len());
        assert_eq!(field.top.len(), field.speed.len());
        assert!(field.top.iter().all(|t| TOP_PERCENT.contains(t)));
        assert!(field.speed.iter().all(|s| SPEED_SECS.contains(s)));
    }

    #[test]
    fn test_low_band_shape() {
        for c in 0..20 {
            let field = generate(c);
            assert_eq!(field.rendered, 4);
            assert_eq!(field.draws(), c as usize);
            assert!(field.scale.iter().all(|s| (0.4..1.0).contains(s)));
            assert_ranges(&field);
        }
    }

    #[test]
    fn test_zero_coverage() {
        let field = generate(0);
        assert_eq!(field.rendered, 4);
        assert!(field.scale.is_empty());
        assert!(field.top.is_empty());
        assert!(field.speed.is_empty());
        assert_eq!(field.sprites().count(), 0);
    }

    #[test]
    fn test_band_counts() {
        assert_eq!(band_for(19).rendered, 4);
        assert_eq!(band_for(20).rendered, 8);
        assert_eq!(band_for(39).rendered, 8);
        assert_eq!(band_for(40).rendered, 12);
        assert_eq!(band_for(60).rendered, 15);
        assert_eq!(band_for(80).rendered, 15);
        assert_eq!(band_for(100).rendered, 15);
        assert_eq!(band_for(101).rendered, 6);
        assert_eq!(band_for(-1).rendered, 6);
    }

    #[test]
    fn test_draws_follow_coverage_not_render_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = generate_with(75, &mut rng);
        assert_eq!(field.rendered, 15);
        assert_eq!(field.draws(), 75);
        assert_eq!(field.sprites().count(), 15);
        assert_ranges(&field);
    }

    #[test]
    fn test_fallback_band() {
        let mut rng = StdRng::seed_from_u64(11);
        let field = generate_with(130, &mut rng);
        assert_eq!(field.rendered, 6);
        assert_eq!(field.draws(), 100);
        assert!(field.scale.iter().all(|s| (40.0..200.0).contains(s)));
        assert_ranges(&field);

        let negative = generate_with(-5, &mut rng);
        assert_eq!(negative.rendered, 6);
        assert_eq!(negative.draws(), 0);
    }

    #[test]
    fn test_huge_coverage_is_bounded() {
        let mut rng = StdRng::seed_from_u64(13);
        let field = generate_with(i64::MAX, &mut rng);
        assert_eq!(field.rendered, 6);
        assert_eq!(field.draws(), MAX_DRAWS as usize);
        assert_eq!(field.sprites().count(), 6);
        assert_ranges(&field);
    }

    #[test]
    fn test_repeat_calls_keep_shape() {
        let a = generate(55);
        let b = generate(55);
        assert_eq!(a.rendered, b.rendered);
        assert_eq!(a.draws(), b.draws());
        assert_ranges(&a);
        assert_ranges(&b);
    }

    #[test]
    fn test_sprites_capped_by_draws() {
        let mut rng = StdRng::seed_from_u64(3);
        let field = generate_with(2, &mut rng);
        assert_eq!(field.rendered, 4);
        let sprites: Vec<_> = field.sprites().collect();
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[1].top_pct, field.top[1]);
    }
}
