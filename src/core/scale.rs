use serde::{Deserialize, Serialize};

use crate::core::ticks::{self, TickValues};
use crate::core::types::finite_or_zero;
use crate::error::{ChartError, ChartResult};

/// Default headroom reserved above the tallest data point.
pub const DEFAULT_HEADROOM: f64 = 1.1;
/// Tick count used when rounding an upper bound to a "nice" value.
pub const NICE_TICK_COUNT: usize = 5;

/// Continuous `domain -> pixel` mapping.
///
/// The range may be inverted (`range_start > range_end`), which is how every
/// y-scale maps increasing values to decreasing pixel rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() || domain.0 == domain.1 {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
        })
    }

    /// Builds `[0, nice(max * headroom)]` over `range`.
    ///
    /// Non-finite or non-positive maxima fall back to a unit domain so a chart
    /// with all-zero values still gets a drawable axis.
    #[must_use]
    pub fn with_headroom(max_value: f64, headroom: f64, range: (f64, f64)) -> Self {
        let headroom = if headroom.is_finite() && headroom > 1.0 {
            headroom
        } else {
            DEFAULT_HEADROOM
        };
        let max_value = finite_or_zero(max_value);
        let upper = if max_value > 0.0 {
            let (_, nice_upper) = ticks::nice(0.0, max_value * headroom, NICE_TICK_COUNT);
            nice_upper.max(max_value * headroom)
        } else {
            1.0
        };

        Self {
            domain_start: 0.0,
            domain_end: upper,
            range_start: finite_or_zero(range.0),
            range_end: finite_or_zero(range.1),
        }
    }

    /// Builds `[0, max(values) * headroom]` from an iterator of raw values.
    #[must_use]
    pub fn from_values_with_headroom(
        values: impl IntoIterator<Item = f64>,
        headroom: f64,
        range: (f64, f64),
    ) -> Self {
        let max_value = values
            .into_iter()
            .map(finite_or_zero)
            .fold(0.0_f64, f64::max);
        Self::with_headroom(max_value, headroom, range)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let value = finite_or_zero(value);
        let span = self.domain_end - self.domain_start;
        let normalized = (value - self.domain_start) / span;
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return self.domain_start;
        }
        let normalized = (finite_or_zero(pixel) - self.range_start) / span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    #[must_use]
    pub fn ticks(self, count: usize) -> TickValues {
        ticks::ticks(self.domain_start, self.domain_end, count)
    }
}

/// Square-root scale: encoded area grows linearly with the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SqrtScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl SqrtScale {
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain_start = finite_or_zero(domain.0).max(0.0);
        let domain_end = finite_or_zero(domain.1).max(0.0);
        Self {
            domain_start,
            domain_end,
            range_start: finite_or_zero(range.0),
            range_end: finite_or_zero(range.1),
        }
    }

    /// Domain `[min, max]` of the given values.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values.into_iter().map(finite_or_zero) {
            min = min.min(value);
            max = max.max(value);
        }
        if !min.is_finite() || !max.is_finite() {
            return Self::new((0.0, 1.0), range);
        }
        Self::new((min, max), range)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let root_start = self.domain_start.sqrt();
        let root_span = self.domain_end.sqrt() - root_start;
        if root_span == 0.0 {
            return (self.range_start + self.range_end) * 0.5;
        }
        let normalized = (finite_or_zero(value).max(0.0).sqrt() - root_start) / root_span;
        self.range_start + normalized * (self.range_end - self.range_start)
    }
}
