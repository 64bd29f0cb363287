use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::types::finite_or_zero;

/// Default inner padding for bar slots.
pub const DEFAULT_BAND_PADDING: f64 = 0.25;

/// Categorical scale with fixed-width slots.
///
/// Domain order is insertion order; duplicates collapse onto their first slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    domain: IndexSet<String>,
    range_start: f64,
    range_end: f64,
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    step: f64,
    bandwidth: f64,
    origin: f64,
}

impl BandScale {
    #[must_use]
    pub fn new<I, S>(domain: I, range: (f64, f64), padding: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let padding = clamp_padding(padding);
        let mut scale = Self {
            domain: domain.into_iter().map(Into::into).collect(),
            range_start: finite_or_zero(range.0),
            range_end: finite_or_zero(range.1),
            padding_inner: padding,
            padding_outer: padding,
            align: 0.5,
            step: 0.0,
            bandwidth: 0.0,
            origin: 0.0,
        };
        scale.rescale();
        scale
    }

    #[must_use]
    pub fn with_outer_padding(mut self, padding_outer: f64) -> Self {
        self.padding_outer = clamp_padding(padding_outer);
        self.rescale();
        self
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let (start, stop) = if self.reversed() {
            (self.range_end, self.range_start)
        } else {
            (self.range_start, self.range_end)
        };
        let denominator = (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        let step = (stop - start) / denominator;
        self.step = step;
        self.bandwidth = step * (1.0 - self.padding_inner);
        self.origin = start + (stop - start - step * (n - self.padding_inner)) * self.align;
    }

    fn reversed(&self) -> bool {
        self.range_end < self.range_start
    }

    #[must_use]
    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Leading pixel edge of the slot for `key`.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<f64> {
        let index = self.domain.get_index_of(key)?;
        let slot = if self.reversed() {
            self.domain.len() - 1 - index
        } else {
            index
        };
        Some(self.origin + self.step * slot as f64)
    }

    /// Slot centre for `key`.
    #[must_use]
    pub fn center(&self, key: &str) -> Option<f64> {
        self.position(key).map(|start| start + self.bandwidth * 0.5)
    }
}

/// Categorical scale producing zero-width anchors (years, days, metrics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointScale {
    band: BandScale,
}

impl PointScale {
    /// `padding` reserves edge space only, measured in steps.
    #[must_use]
    pub fn new<I, S>(domain: I, range: (f64, f64), padding: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut band = BandScale::new(domain, range, 0.0);
        band.padding_inner = 1.0;
        band.padding_outer = finite_or_zero(padding).max(0.0);
        band.rescale();
        Self { band }
    }

    #[must_use]
    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.band.domain()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.band.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.band.is_empty()
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.band.step()
    }

    #[must_use]
    pub fn position(&self, key: &str) -> Option<f64> {
        self.band.position(key)
    }

    #[must_use]
    pub fn position_at(&self, index: usize) -> Option<f64> {
        let key = self.band.domain.get_index(index)?;
        self.band.position(key)
    }

    /// Anchor positions in domain order.
    #[must_use]
    pub fn positions(&self) -> Vec<f64> {
        (0..self.len())
            .filter_map(|index| self.position_at(index))
            .collect()
    }
}

/// Index of the anchor closest to `pixel`; ties resolve to the lower index.
#[must_use]
pub fn nearest_position_index(positions: &[f64], pixel: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, position) in positions.iter().enumerate() {
        let distance = (position - pixel).abs();
        if !distance.is_finite() {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

fn clamp_padding(padding: f64) -> f64 {
    if padding.is_finite() {
        padding.clamp(0.0, 0.95)
    } else {
        DEFAULT_BAND_PADDING
    }
}
