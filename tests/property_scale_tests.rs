use chart_gallery::core::{LinearScale, SqrtScale};
use chart_gallery::palette::Palette;
use proptest::prelude::*;

proptest! {
    #[test]
    fn y_scale_reverses_value_order(
        max in 0.1f64..1_000_000.0,
        a_ratio in 0.0f64..1.0,
        b_ratio in 0.0f64..1.0,
        bottom in 200.0f64..1_000.0,
        top in 0.0f64..150.0
    ) {
        let scale = LinearScale::with_headroom(max, 1.1, (bottom, top));
        let (a, b) = (a_ratio.min(b_ratio) * max, a_ratio.max(b_ratio) * max);
        prop_assert!(scale.map(a) >= scale.map(b));
    }

    #[test]
    fn x_scale_preserves_value_order(
        max in 0.1f64..1_000_000.0,
        a_ratio in 0.0f64..1.0,
        b_ratio in 0.0f64..1.0,
        left in 0.0f64..100.0,
        width in 10.0f64..2_000.0
    ) {
        let scale = LinearScale::with_headroom(max, 1.1, (left, left + width));
        let (a, b) = (a_ratio.min(b_ratio) * max, a_ratio.max(b_ratio) * max);
        prop_assert!(scale.map(a) <= scale.map(b));
    }

    #[test]
    fn headroom_keeps_marks_below_plot_top(
        values in prop::collection::vec(0.0f64..100_000.0, 1..40),
        headroom in 1.05f64..1.15
    ) {
        let max = values.iter().copied().fold(0.0, f64::max);
        prop_assume!(max > 0.0);
        let scale = LinearScale::from_values_with_headroom(
            values.iter().copied(),
            headroom,
            (400.0, 20.0),
        );
        let (_, upper) = scale.domain();
        prop_assert!(upper > max);
        prop_assert!(upper >= max * headroom - 1e-9);
        prop_assert!(scale.map(max) > 20.0);
    }

    #[test]
    fn palette_resolution_is_deterministic(
        key in "[a-zA-Z]{1,12}",
        index in 0usize..64,
        total in 1usize..64
    ) {
        let palette = Palette::cities();
        let first = palette.resolve(&key, index, total);
        let second = palette.resolve(&key, index, total);
        prop_assert_eq!(first.to_hex(), second.to_hex());
        prop_assert_eq!(first, second);
        let ramp = Palette::ramp_only();
        prop_assert_eq!(ramp.resolve(&key, index, total), ramp.resolve("other", index, total));
    }

    #[test]
    fn sqrt_radius_stays_in_range(
        shops in prop::collection::vec(0.0f64..500.0, 2..30),
        pick in 0usize..30
    ) {
        let scale = SqrtScale::from_values(shops.iter().copied(), (12.0, 36.0));
        let value = shops[pick % shops.len()];
        let radius = scale.map(value);
        prop_assert!((12.0 - 1e-9..=36.0 + 1e-9).contains(&radius));
    }
}
