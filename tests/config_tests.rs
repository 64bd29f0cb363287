use chart_gallery::charts::LegendPlacement;
use chart_gallery::config::{GALLERY_CONFIG_JSON_SCHEMA_V1, GalleryConfig};
use chart_gallery::core::ChartLayout;

#[test]
fn versioned_document_round_trips() {
    let mut config = GalleryConfig::default();
    config.bar.sort_descending = true;
    config.bar.layout = ChartLayout::new(640.0, 360.0);
    config.live_bar.tick_interval_ms = 1_500;
    config.radial.metrics = Some(vec!["air".to_owned(), "noise".to_owned()]);
    config.line.legend = LegendPlacement::Hidden;

    let json = config.to_json_pretty().expect("serialize");
    assert!(json.contains(&format!("\"schema_version\": {GALLERY_CONFIG_JSON_SCHEMA_V1}")));

    let parsed = GalleryConfig::from_json_str(&json).expect("parse");
    assert!(parsed.bar.sort_descending);
    assert_eq!(parsed.bar.layout.width, 640.0);
    assert_eq!(parsed.bar.layout.height, 360.0);
    assert_eq!(parsed.live_bar.tick_interval_ms, 1_500);
    assert_eq!(parsed.radial.metrics, config.radial.metrics);
    assert_eq!(parsed.line.legend, LegendPlacement::Hidden);
}

#[test]
fn bare_object_is_accepted() {
    let parsed = GalleryConfig::from_json_str(r#"{ "bar": { "sort_descending": true } }"#)
        .expect("parse bare config");
    assert!(parsed.bar.sort_descending);
    assert_eq!(parsed.bar.duration_ms, GalleryConfig::default().bar.duration_ms);
}

#[test]
fn partial_document_falls_back_to_defaults() {
    let document = r#"{ "schema_version": 1, "config": { "live_bar": { "highlight_ms": 900 } } }"#;
    let parsed = GalleryConfig::from_json_str(document).expect("parse partial config");
    let defaults = GalleryConfig::default();
    assert_eq!(parsed.live_bar.highlight_ms, 900);
    assert_eq!(parsed.live_bar.tick_interval_ms, defaults.live_bar.tick_interval_ms);
    assert_eq!(parsed.bubble.radius_range, defaults.bubble.radius_range);
    assert_eq!(parsed.parallel.metrics, None);
}

#[test]
fn unknown_schema_version_is_rejected() {
    let err = GalleryConfig::from_json_str(r#"{ "schema_version": 2, "config": {} }"#)
        .expect_err("version 2");
    assert!(err.to_string().contains("schema version"));
}

#[test]
fn malformed_json_is_rejected() {
    assert!(GalleryConfig::from_json_str("{ not json").is_err());
    assert!(GalleryConfig::from_json_str(r#"{ "bar": { "sort_descending": "yes" } }"#).is_err());
}
