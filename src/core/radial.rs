use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::core::types::finite_or_zero;

/// Upper bound of the normalized score every radial axis shares.
pub const RADIAL_DOMAIN_MAX: f64 = 10.0;

/// Maps a normalized `0..=10` score to a radius.
///
/// The domain is fixed rather than derived from data so every metric axis
/// shares one radius scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialScale {
    radius: f64,
}

impl RadialScale {
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self {
            radius: finite_or_zero(radius).max(0.0),
        }
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (0.0, RADIAL_DOMAIN_MAX)
    }

    #[must_use]
    pub fn radius(self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        finite_or_zero(value) / RADIAL_DOMAIN_MAX * self.radius
    }
}

/// Angle of axis `index` out of `count`, zero at twelve o'clock, clockwise.
#[must_use]
pub fn axis_angle(index: usize, count: usize) -> f64 {
    if count == 0 {
        return -FRAC_PI_2;
    }
    TAU * index as f64 / count as f64 - FRAC_PI_2
}

/// Cartesian point at `angle`/`radius` around `center`.
#[must_use]
pub fn polar_to_cartesian(center: (f64, f64), angle: f64, radius: f64) -> (f64, f64) {
    (
        center.0 + radius * angle.cos(),
        center.1 + radius * angle.sin(),
    )
}

/// Axis whose angle is closest to the pointer direction seen from `center`.
///
/// Distances wrap around the circle; ties resolve to the lower index.
#[must_use]
pub fn nearest_axis_by_angle(
    center: (f64, f64),
    pointer: (f64, f64),
    count: usize,
) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let pointer_angle = (pointer.1 - center.1).atan2(pointer.0 - center.0);
    if !pointer_angle.is_finite() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for index in 0..count {
        let distance = angular_distance(axis_angle(index, count), pointer_angle);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(TAU);
    if diff > PI { TAU - diff } else { diff }
}
