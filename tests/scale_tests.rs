use approx::assert_relative_eq;
use chart_gallery::ChartError;
use chart_gallery::core::{
    BandScale, ChartLayout, LinearScale, Margins, PointScale, RadialScale, SqrtScale, axis_angle,
    nearest_axis_by_angle, nearest_position_index, polar_to_cartesian,
};
use std::f64::consts::FRAC_PI_2;

#[test]
fn headroom_domain_exceeds_max_and_is_rounded() {
    let scale = LinearScale::with_headroom(58.0, 1.1, (396.0, 24.0));
    let (start, end) = scale.domain();
    assert_eq!(start, 0.0);
    assert!(end > 58.0 * 1.1 - 1e-9);
    assert_eq!(end, end.round());
}

#[test]
fn y_scale_is_inverted() {
    let scale = LinearScale::with_headroom(100.0, 1.1, (400.0, 20.0));
    assert!(scale.map(80.0) < scale.map(20.0));
    assert_relative_eq!(scale.map(0.0), 400.0);
}

#[test]
fn degenerate_linear_domain_is_rejected() {
    assert!(LinearScale::new((3.0, 3.0), (0.0, 100.0)).is_err());
    assert!(LinearScale::new((0.0, f64::NAN), (0.0, 100.0)).is_err());
}

#[test]
fn all_zero_values_still_get_a_domain() {
    let scale = LinearScale::from_values_with_headroom([0.0, f64::NAN, -4.0], 1.1, (300.0, 0.0));
    assert_eq!(scale.domain(), (0.0, 1.0));
    assert!(scale.map(0.5).is_finite());
}

#[test]
fn single_category_band_has_positive_bandwidth() {
    let scale = BandScale::new(["Berlin"], (56.0, 696.0), 0.25);
    assert!(scale.bandwidth() > 0.0);
    let x = scale.position("Berlin").expect("known key");
    assert!(x >= 56.0 && x + scale.bandwidth() <= 696.0 + 1e-9);
}

#[test]
fn band_scale_keeps_dataset_order() {
    let scale = BandScale::new(["Köln", "Berlin", "Hamburg"], (0.0, 300.0), 0.2);
    let order: Vec<&str> = scale.domain().collect();
    assert_eq!(order, vec!["Köln", "Berlin", "Hamburg"]);
    assert!(scale.position("Köln") < scale.position("Berlin"));
}

#[test]
fn point_scale_spreads_anchors_evenly() {
    let scale = PointScale::new(["2019", "2020", "2021"], (0.0, 200.0), 0.0);
    assert_eq!(scale.positions(), vec![0.0, 100.0, 200.0]);
    let single = PointScale::new(["2024"], (0.0, 200.0), 0.5);
    assert_relative_eq!(single.position("2024").expect("anchor"), 100.0);
}

#[test]
fn nearest_position_ties_go_to_lower_index() {
    assert_eq!(nearest_position_index(&[0.0, 100.0, 200.0], 50.0), Some(0));
    assert_eq!(nearest_position_index(&[0.0, 100.0, 200.0], 151.0), Some(2));
    assert_eq!(nearest_position_index(&[], 10.0), None);
}

#[test]
fn sqrt_radius_ratio_follows_area() {
    let scale = SqrtScale::new((0.0, 18.0), (0.0, 36.0));
    assert_relative_eq!(scale.map(18.0) / scale.map(2.0), 3.0, epsilon = 1e-9);

    let bubbles = SqrtScale::from_values([2.0, 18.0], (12.0, 36.0));
    assert_relative_eq!(bubbles.map(2.0), 12.0, epsilon = 1e-9);
    assert_relative_eq!(bubbles.map(18.0), 36.0, epsilon = 1e-9);
    assert_relative_eq!(bubbles.map(18.0) / bubbles.map(2.0), 3.0, epsilon = 1e-9);
}

#[test]
fn radial_axes_start_at_twelve_o_clock() {
    assert_relative_eq!(axis_angle(0, 4), -FRAC_PI_2);
    let (x, y) = polar_to_cartesian((100.0, 100.0), axis_angle(1, 4), 50.0);
    assert_relative_eq!(x, 150.0, epsilon = 1e-9);
    assert_relative_eq!(y, 100.0, epsilon = 1e-9);
    assert_relative_eq!(RadialScale::new(200.0).map(5.0), 100.0);
}

#[test]
fn nearest_radial_axis_uses_pointer_angle() {
    let center = (100.0, 100.0);
    assert_eq!(nearest_axis_by_angle(center, (100.0, 10.0), 4), Some(0));
    assert_eq!(nearest_axis_by_angle(center, (190.0, 105.0), 4), Some(1));
    assert_eq!(nearest_axis_by_angle(center, (20.0, 100.0), 4), Some(3));
    assert_eq!(nearest_axis_by_angle(center, (20.0, 100.0), 0), None);
}

#[test]
fn layout_rejects_non_finite_margins() {
    assert!(ChartLayout::new(720.0, 420.0).validate().is_ok());

    for margins in [
        Margins::new(f64::NAN, 24.0, 48.0, 56.0),
        Margins::new(24.0, f64::INFINITY, 48.0, 56.0),
        Margins::new(24.0, 24.0, f64::NAN, 56.0),
        Margins::new(24.0, 24.0, 48.0, f64::NEG_INFINITY),
    ] {
        let layout = ChartLayout::new(720.0, 420.0).with_margins(margins);
        assert!(matches!(layout.validate(), Err(ChartError::InvalidData(_))));
    }
}
