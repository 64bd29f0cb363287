use smallvec::SmallVec;

/// Tick values for one axis; axes rarely carry more than a dozen ticks.
pub type TickValues = SmallVec<[f64; 12]>;

pub const AXIS_VALUE_TARGET_SPACING_PX: f64 = 48.0;
pub const AXIS_MIN_TICKS: usize = 2;
pub const AXIS_MAX_TICKS: usize = 10;

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Number of ticks that fits an axis of `axis_span_px` at the target spacing.
#[must_use]
pub fn axis_tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks)
}

/// Signed tick increment between `start` and `stop`.
///
/// Positive results are the step itself; negative results `-k` mean a step of
/// `1 / k`, which keeps sub-unit steps exact when multiplied back.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let count = count.max(1) as f64;
    let step = (stop - start) / count;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Evenly spaced "round" values covering `[start, stop]`.
#[must_use]
pub fn ticks(start: f64, stop: f64, count: usize) -> TickValues {
    let mut out = TickValues::new();
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return out;
    }
    if start == stop {
        out.push(start);
        return out;
    }
    let (lo, hi, reversed) = if stop < start {
        (stop, start, true)
    } else {
        (start, stop, false)
    };

    let increment = tick_increment(lo, hi, count);
    if increment == 0.0 {
        return out;
    }
    if increment > 0.0 {
        let first = (lo / increment).ceil() as i64;
        let last = (hi / increment).floor() as i64;
        for i in first..=last {
            out.push(i as f64 * increment);
        }
    } else {
        let inverse = -increment;
        let first = (lo * inverse).ceil() as i64;
        let last = (hi * inverse).floor() as i64;
        for i in first..=last {
            out.push(i as f64 / inverse);
        }
    }
    if reversed {
        out.reverse();
    }
    out
}

/// Extends `[start, stop]` outward to round tick boundaries.
#[must_use]
pub fn nice(start: f64, stop: f64, count: usize) -> (f64, f64) {
    if !start.is_finite() || !stop.is_finite() || start >= stop {
        return (start, stop);
    }

    let (mut lo, mut hi) = (start, stop);
    let mut previous = None;
    for _ in 0..10 {
        let step = tick_increment(lo, hi, count);
        if previous == Some(step) || step == 0.0 {
            break;
        }
        if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        }
        previous = Some(step);
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_round_and_cover_domain() {
        let values = ticks(0.0, 64.0, 5);
        assert_eq!(values.as_slice(), &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
    }

    #[test]
    fn nice_rounds_upper_bound_outward() {
        let (lo, hi) = nice(0.0, 63.8, 5);
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 70.0);
    }

    #[test]
    fn sub_unit_ticks_stay_exact() {
        let values = ticks(0.0, 1.0, 5);
        assert_eq!(values.as_slice(), &[0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    }
}
