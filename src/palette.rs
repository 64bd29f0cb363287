//! Categorical color resolution.
//!
//! Keys found in a palette table get their fixed color. Anything else falls
//! back to a viridis ramp sampled at `index / max(1, total - 1)`, so the same
//! index always yields the same color and unknown keys stay well separated.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::render::Color;

/// Lightness delta between a base color and its gradient stops.
pub const GRADIENT_LIGHTNESS_SHIFT: f64 = 0.12;

const VIRIDIS_STOPS: [u32; 9] = [
    0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];

/// Top/bottom stops of a vertical gradient fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStops {
    pub top: Color,
    pub bottom: Color,
}

impl GradientStops {
    /// Lighter top, darker bottom, both derived from `base`.
    #[must_use]
    pub fn from_base(base: Color) -> Self {
        Self {
            top: base.shift_lightness(GRADIENT_LIGHTNESS_SHIFT),
            bottom: base.shift_lightness(-GRADIENT_LIGHTNESS_SHIFT),
        }
    }
}

/// Samples the viridis ramp at `t` (clamped to `[0, 1]`).
#[must_use]
pub fn viridis(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS_STOPS.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(VIRIDIS_STOPS.len() - 1);
    let local = scaled - lower as f64;
    Color::from_hex(VIRIDIS_STOPS[lower]).lerp(Color::from_hex(VIRIDIS_STOPS[upper]), local)
}

/// Ramp position of `index` among `total` entries.
#[must_use]
pub fn ramp_position(index: usize, total: usize) -> f64 {
    let denominator = total.saturating_sub(1).max(1) as f64;
    (index as f64 / denominator).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Palette {
    table: IndexMap<String, Color>,
}

impl Palette {
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Color)>,
        S: Into<String>,
    {
        Self {
            table: entries
                .into_iter()
                .map(|(key, color)| (key.into(), color))
                .collect(),
        }
    }

    /// Palette with no table; every key uses the ramp.
    #[must_use]
    pub fn ramp_only() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cities() -> Self {
        Self::from_hex_table(&[
            ("Berlin", 0xe4572e),
            ("Hamburg", 0x17bebb),
            ("München", 0x2e86ab),
            ("Köln", 0xffc914),
            ("Frankfurt", 0x76b041),
            ("Stuttgart", 0x9c6ade),
            ("Düsseldorf", 0xf25f5c),
            ("Leipzig", 0x3d5a80),
        ])
    }

    #[must_use]
    pub fn menu_types() -> Self {
        Self::from_hex_table(&[
            ("vegan", 0x4caf50),
            ("vegetarian", 0x8bc34a),
            ("mixed", 0xff9800),
            ("meat", 0xe53935),
        ])
    }

    #[must_use]
    pub fn networks() -> Self {
        Self::from_hex_table(&[
            ("BLUME", 0x1f77b4),
            ("LUBW", 0xff7f0e),
            ("LANUV", 0x2ca02c),
            ("LfU", 0xd62728),
            ("UBA", 0x9467bd),
        ])
    }

    #[must_use]
    pub fn time_of_day() -> Self {
        Self::from_hex_table(&[
            ("morning", 0xf6c85f),
            ("noon", 0xf29e4c),
            ("afternoon", 0xe76f51),
            ("evening", 0x6f4e7c),
            ("night", 0x264653),
        ])
    }

    fn from_hex_table(entries: &[(&str, u32)]) -> Self {
        Self::new(entries.iter().map(|&(key, hex)| (key, Color::from_hex(hex))))
    }

    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Color> {
        self.table.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Flat color for `key`, falling back to the ramp at `index` of `total`.
    #[must_use]
    pub fn resolve(&self, key: &str, index: usize, total: usize) -> Color {
        self.lookup(key)
            .unwrap_or_else(|| viridis(ramp_position(index, total)))
    }

    /// Gradient stops for `key`; same fallback rule as `resolve`.
    #[must_use]
    pub fn resolve_gradient(&self, key: &str, index: usize, total: usize) -> GradientStops {
        GradientStops::from_base(self.resolve(key, index, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_endpoints_match_viridis() {
        assert_eq!(viridis(0.0), Color::from_hex(0x440154));
        assert_eq!(viridis(1.0), Color::from_hex(0xfde725));
        assert_eq!(viridis(7.0), Color::from_hex(0xfde725));
    }

    #[test]
    fn single_entry_ramp_position_is_zero() {
        assert_eq!(ramp_position(0, 1), 0.0);
        assert_eq!(ramp_position(3, 0), 1.0);
    }

    #[test]
    fn gradient_top_is_lighter_than_bottom() {
        let stops = Palette::cities().resolve_gradient("Berlin", 0, 1);
        let luminance = |c: Color| c.red + c.green + c.blue;
        assert!(luminance(stops.top) > luminance(stops.bottom));
    }
}
