use approx::assert_relative_eq;
use chart_gallery::charts::{
    BandSample, BubbleChartConfig, DefaultTranslator, DonutChartConfig, DonutDatum,
    DumbbellChartConfig, LineChartConfig, LinePoint, LineSeries, MultiBandChartConfig,
    ParallelChartConfig, RadialChartConfig, RenderContext, ShopMetrics, StationRecord,
    bubble_geometry, donut_layout, pill_width, render_bubble_chart, render_donut_chart,
    render_dumbbell_chart, render_line_chart, render_multi_band_chart, render_parallel_chart,
    render_radial_chart,
};
use chart_gallery::core::Viewport;
use chart_gallery::interaction::{DIM_OPACITY, PointerEvent, Tooltip};
use chart_gallery::palette::Palette;
use chart_gallery::render::{Container, Shape};

fn opacity(container: &Container, id: chart_gallery::render::NodeId) -> f64 {
    container.node(id).expect("node exists").style.opacity
}

/// Legend keys in order; swatch and label of one entry share a key.
fn legend_keys(handle: &chart_gallery::charts::ChartHandle) -> Vec<String> {
    let mut keys: Vec<String> = handle.legend_entries().into_iter().map(|(_, key)| key).collect();
    keys.dedup();
    keys
}

fn shops() -> Vec<ShopMetrics> {
    vec![
        ShopMetrics::new("Köln", 80.0, 600.0, 2.0, "vegetarian"),
        ShopMetrics::new("Berlin", 120.0, 900.0, 18.0, "vegan"),
        ShopMetrics::new("Hamburg", 60.0, 450.0, 8.0, "vegan"),
    ]
}

fn station(network: &str, code: &str, values: &[(&str, f64)]) -> StationRecord {
    StationRecord {
        network: network.to_owned(),
        code: code.to_owned(),
        name: format!("Station {code}"),
        environment: "urban".to_owned(),
        station_type: "traffic".to_owned(),
        values: values.iter().map(|(key, value)| ((*key).to_owned(), *value)).collect(),
    }
}

#[test]
fn line_legend_hover_dims_other_series() {
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let series = vec![
        LineSeries::new("Berlin", vec![LinePoint::new("2019", 10.0), LinePoint::new("2020", 14.0)]),
        LineSeries::new("Köln", vec![LinePoint::new("2019", 6.0), LinePoint::new("2020", 9.0)]),
    ];
    let handle = render_line_chart(&ctx, &series, &LineChartConfig::default()).expect("line chart");

    let berlin = handle.mark_id("Berlin").expect("Berlin path");
    let koeln = handle.mark_id("Köln").expect("Köln path");
    let koeln_point = handle.mark_id("Köln:2020").expect("Köln point");
    assert_eq!(legend_keys(&handle), vec!["Berlin".to_owned(), "Köln".to_owned()]);

    assert!(handle.legend_enter("Berlin"));
    assert_eq!(handle.highlighted_key().as_deref(), Some("Berlin"));
    assert_eq!(opacity(&container, berlin), 1.0);
    assert_relative_eq!(opacity(&container, koeln), DIM_OPACITY);
    assert_relative_eq!(opacity(&container, koeln_point), DIM_OPACITY);

    assert!(handle.legend_leave());
    assert_eq!(opacity(&container, koeln), 1.0);
    assert!(!handle.legend_enter("Hamburg"));
}

#[test]
fn line_hover_thickens_path_and_dims_other_series() {
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let series = vec![
        LineSeries::new("Berlin", vec![LinePoint::new("2019", 10.0), LinePoint::new("2020", 14.0)]),
        LineSeries::new("Köln", vec![LinePoint::new("2019", 6.0)]),
    ];
    let config = LineChartConfig::default();
    let handle = render_line_chart(&ctx, &series, &config).expect("line chart");
    let berlin = handle.mark_id("Berlin").expect("Berlin path");
    let koeln = handle.mark_id("Köln").expect("Köln path");

    assert!(handle.pointer_enter(berlin, PointerEvent::new(100.0, 100.0)));
    assert_eq!(
        container.node(berlin).expect("path").style.stroke_width,
        Some(config.hover_stroke_width)
    );
    assert_relative_eq!(opacity(&container, koeln), DIM_OPACITY);
    assert!(tooltip.state().expect("tooltip").html.contains("Berlin"));

    assert!(handle.pointer_leave(berlin));
    assert_eq!(opacity(&container, koeln), 1.0);
    assert_eq!(container.node(berlin).expect("path").style.stroke_width, None);
}

#[test]
fn donut_colours_slices_by_rank_and_keeps_true_tooltips() {
    let data = vec![
        DonutDatum::new("2024-05-01", "morning", 10.0),
        DonutDatum::new("2024-05-01", "noon", 30.0),
        DonutDatum::new("2024-05-01", "evening", 20.0),
        DonutDatum::new("2024-05-02", "morning", 5.0),
        DonutDatum::new("2024-05-02", "noon", 5.0),
    ];
    let config = DonutChartConfig::default();
    let layout = donut_layout(&data, &config);

    let legend: Vec<&str> = layout.legend.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(legend, vec!["morning", "noon", "evening"]);
    assert_eq!(layout.rings.len(), 2);
    assert_eq!(layout.rings[0].day, "2024-05-01");
    assert!(layout.rings[0].outer_radius <= layout.rings[1].inner_radius);

    let first: Vec<&str> =
        layout.rings[0].slices.iter().map(|slice| slice.segment.as_str()).collect();
    assert_eq!(first, vec!["noon", "evening", "morning"]);
    assert_eq!(layout.rings[0].slices[0].color, layout.legend[0].1);
    assert_eq!(layout.rings[0].slices[2].color, layout.legend[2].1);

    let tied: Vec<&str> =
        layout.rings[1].slices.iter().map(|slice| slice.segment.as_str()).collect();
    assert_eq!(tied, vec!["morning", "noon"]);

    let container = Container::new(Viewport::new(480, 480));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let handle = render_donut_chart(&ctx, &data, &config).expect("donut chart");
    let noon = handle.mark_id("2024-05-01:noon").expect("noon slice");
    assert!(handle.pointer_enter(noon, PointerEvent::new(240.0, 200.0)));
    assert!(tooltip.state().expect("tooltip").html.contains("noon: 30"));
}

#[test]
fn multi_band_panels_stack_and_share_series_highlight() {
    let data = vec![
        BandSample::new("2024-05-01", "walk", "Berlin", 12.0),
        BandSample::new("2024-05-02", "walk", "Berlin", 18.0),
        BandSample::new("2024-05-01", "walk", "Köln", 7.0),
        BandSample::new("2024-05-02", "walk", "Köln", 9.0),
        BandSample::new("2024-05-01", "bike", "Berlin", 300.0),
        BandSample::new("2024-05-02", "bike", "Berlin", 320.0),
        BandSample::new("2024-05-01", "bike", "Köln", 150.0),
    ];
    let container = Container::new(Viewport::new(720, 560));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let handle =
        render_multi_band_chart(&ctx, &data, &MultiBandChartConfig::default()).expect("multi band");

    let circle_y = |key: &str| {
        let id = handle.mark_id(key).expect("point");
        match container.node(id).expect("node").shape {
            Shape::Circle(circle) => circle.cy,
            other => panic!("expected a circle, got {other:?}"),
        }
    };
    assert!(circle_y("bike:Berlin:2024-05-01") > circle_y("walk:Berlin:2024-05-01"));
    assert!(handle.mark_id("bike:Köln:2024-05-02").is_none());

    let frame = container.frame();
    assert_eq!(frame.texts().filter(|text| *text == "01.05.").count(), 1);

    let walk_berlin = handle.mark_id("walk:Berlin").expect("walk path");
    let bike_berlin = handle.mark_id("bike:Berlin").expect("bike path");
    let walk_koeln = handle.mark_id("walk:Köln").expect("walk Köln path");
    assert!(handle.pointer_enter(walk_berlin, PointerEvent::new(300.0, 120.0)));
    assert_eq!(opacity(&container, bike_berlin), 1.0);
    assert_relative_eq!(opacity(&container, walk_koeln), DIM_OPACITY);
}

#[test]
fn dumbbell_dots_are_keyed_per_city_and_metric() {
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let handle =
        render_dumbbell_chart(&ctx, &shops(), &DumbbellChartConfig::default()).expect("dumbbell");

    assert_eq!(handle.marks().len(), 6);
    let customers = handle.mark_id("Berlin:customers").expect("customers dot");
    let revenue = handle.mark_id("Berlin:revenue").expect("revenue dot");
    let koeln = handle.mark_id("Köln:customers").expect("Köln dot");
    assert_eq!(legend_keys(&handle), vec!["customers".to_owned(), "revenue".to_owned()]);

    assert!(handle.pointer_enter(customers, PointerEvent::new(200.0, 100.0)));
    assert_eq!(opacity(&container, koeln), 1.0);
    let html = tooltip.state().expect("tooltip").html;
    assert!(html.contains("Berlin"));
    assert!(html.contains("Shops: 18"));
    handle.pointer_leave(customers);

    assert!(handle.legend_enter("revenue"));
    assert_eq!(opacity(&container, revenue), 1.0);
    assert_relative_eq!(opacity(&container, customers), DIM_OPACITY);
}

#[test]
fn bubbles_paint_largest_first_with_pill_labels() {
    let container = Container::new(Viewport::new(720, 480));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let config = BubbleChartConfig::default();

    let bubbles = bubble_geometry(&shops(), &config);
    let order: Vec<&str> = bubbles.iter().map(|bubble| bubble.city.as_str()).collect();
    assert_eq!(order, vec!["Berlin", "Hamburg", "Köln"]);
    assert_relative_eq!(bubbles[0].radius / bubbles[2].radius, 3.0, epsilon = 1e-9);
    assert_eq!(bubbles[0].label, "18");
    assert_eq!(bubbles[0].pill_width, pill_width("18"));
    assert_relative_eq!(bubbles[0].label_y, bubbles[0].cy - 22.0);
    assert_eq!(bubbles[0].color, Palette::menu_types().resolve("vegan", 1, 2));

    let handle = render_bubble_chart(&ctx, &shops(), &config).expect("bubble chart");
    let marks: Vec<String> = handle.marks().into_iter().map(|mark| mark.key).collect();
    assert_eq!(marks, vec!["Berlin", "Hamburg", "Köln"]);
    assert_eq!(legend_keys(&handle), vec!["vegetarian".to_owned(), "vegan".to_owned()]);
    assert!(container.frame().texts().any(|text| text == "18"));

    let berlin = handle.mark_id("Berlin").expect("Berlin bubble");
    let hamburg = handle.mark_id("Hamburg").expect("Hamburg bubble");
    assert!(handle.pointer_enter(berlin, PointerEvent::new(400.0, 200.0)));
    assert_relative_eq!(opacity(&container, hamburg), DIM_OPACITY);
}

#[test]
fn parallel_tooltip_follows_nearest_axis() {
    let records = vec![
        station("UBA", "DEUB001", &[("no2", 12.0), ("pm10", 20.0), ("o3", 40.0)]),
        station("LUBW", "DEBW002", &[("no2", 30.0), ("pm10", 25.0), ("o3", 55.0)]),
        station("LUBW", "DEBW003", &[("no2", 18.0), ("o3", 35.0)]),
    ];
    let container = Container::new(Viewport::new(760, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let handle = render_parallel_chart(&ctx, &records, &ParallelChartConfig::default())
        .expect("parallel chart");

    let id = handle.mark_id("DEUB001").expect("station path");
    let other = handle.mark_id("DEBW002").expect("other path");
    assert_relative_eq!(opacity(&container, id), 0.7);

    assert!(handle.pointer_enter(id, PointerEvent::new(700.0, 200.0)));
    let html = tooltip.state().expect("tooltip").html;
    assert!(html.contains("Station DEUB001"));
    assert!(html.contains("o3: 40"));
    assert_eq!(opacity(&container, id), 1.0);
    assert_relative_eq!(opacity(&container, other), DIM_OPACITY);

    assert!(handle.pointer_move(id, PointerEvent::new(60.0, 200.0)));
    let html = tooltip.state().expect("tooltip").html;
    assert!(html.contains("no2: 12"));
    assert!(!html.contains("o3: 40"));

    assert!(handle.pointer_leave(id));
    assert_relative_eq!(opacity(&container, id), 0.7);
    assert_relative_eq!(opacity(&container, other), 0.7);

    let sparse_id = handle.mark_id("DEBW003").expect("sparse path");
    let sparse = match container.node(sparse_id).expect("node").shape {
        Shape::Path(path) => path.commands.len(),
        other => panic!("expected a path, got {other:?}"),
    };
    assert_eq!(sparse, 2);
}

#[test]
fn radial_tooltip_uses_pointer_angle_and_raw_values() {
    let records = vec![
        station("LfU", "DEBY001", &[("air", 4.0), ("noise", 14.0), ("green", 6.0), ("water", 8.0)]),
        station("LANUV", "DENW002", &[("air", 7.0), ("noise", 3.0), ("green", 9.0)]),
    ];
    let config = RadialChartConfig::default();
    let center = config.layout.center();
    let container = Container::new(Viewport::new(520, 520));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);
    let handle = render_radial_chart(&ctx, &records, &config).expect("radial chart");

    let id = handle.mark_id("DEBY001").expect("polygon");
    assert!(handle.pointer_enter(id, PointerEvent::new(center.0, center.1 - 80.0)));
    assert!(tooltip.state().expect("tooltip").html.contains("air: 4"));

    assert!(handle.pointer_move(id, PointerEvent::new(center.0 + 80.0, center.1 + 2.0)));
    assert!(tooltip.state().expect("tooltip").html.contains("noise: 14"));

    let other = handle.mark_id("DENW002").expect("second polygon");
    handle.pointer_leave(id);
    assert!(handle.pointer_enter(other, PointerEvent::new(center.0 - 2.0, center.1 - 80.0)));
    assert!(tooltip.state().expect("tooltip").html.contains("air: 7"));
    assert!(handle.pointer_move(other, PointerEvent::new(center.0 - 80.0, center.1)));
    assert!(tooltip.state().expect("tooltip").html.contains("water: 0"));
}
