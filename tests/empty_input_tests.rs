use std::rc::Rc;

use chart_gallery::charts::{
    BarChartConfig, BubbleChartConfig, DefaultTranslator, DonutChartConfig, DumbbellChartConfig,
    LineChartConfig, LineSeries, LiveBarConfig, MagnitudeControl, MultiBandChartConfig,
    ParallelChartConfig, RadialChartConfig, RenderContext, SharedContext, StationRecord,
    render_bar_chart, render_bubble_chart, render_donut_chart, render_dumbbell_chart,
    render_line_chart, render_live_bar_chart, render_multi_band_chart, render_parallel_chart,
    render_radial_chart,
};
use chart_gallery::core::Viewport;
use chart_gallery::interaction::{Scheduler, SeededRandom, Tooltip};
use chart_gallery::render::Container;
use indexmap::IndexMap;

fn assert_untouched(container: &Container, tooltip: &Tooltip) {
    assert!(container.is_empty());
    assert!(!tooltip.exists());
}

#[test]
fn every_chart_skips_empty_input() {
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);

    assert!(render_bar_chart(&ctx, &[], &BarChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
    assert!(render_line_chart(&ctx, &[], &LineChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
    assert!(render_donut_chart(&ctx, &[], &DonutChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
    assert!(render_multi_band_chart(&ctx, &[], &MultiBandChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
    assert!(render_dumbbell_chart(&ctx, &[], &DumbbellChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
    assert!(render_bubble_chart(&ctx, &[], &BubbleChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
    assert!(render_parallel_chart(&ctx, &[], &ParallelChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
    assert!(render_radial_chart(&ctx, &[], &RadialChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);

    let scheduler = Scheduler::new();
    let shared = SharedContext::new(&container, &tooltip, Rc::new(DefaultTranslator));
    let live = render_live_bar_chart(
        shared,
        &scheduler,
        Vec::new(),
        &LiveBarConfig::default(),
        MagnitudeControl::default(),
        Box::new(SeededRandom::new(0)),
    );
    assert!(live.is_none());
    assert_eq!(scheduler.pending_count(), 0);
    assert_untouched(&container, &tooltip);
}

#[test]
fn line_series_without_points_count_as_empty() {
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);

    let series = vec![LineSeries::new("Berlin", Vec::new()), LineSeries::new("Köln", Vec::new())];
    assert!(render_line_chart(&ctx, &series, &LineChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
}

#[test]
fn stations_without_metrics_render_nothing() {
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);

    let station = StationRecord {
        network: "UBA".to_owned(),
        code: "DEUB001".to_owned(),
        name: "Westerland".to_owned(),
        environment: "rural".to_owned(),
        station_type: "background".to_owned(),
        values: IndexMap::new(),
    };
    let config = ParallelChartConfig::default();
    assert!(render_parallel_chart(&ctx, std::slice::from_ref(&station), &config).is_none());
    assert!(render_radial_chart(&ctx, &[station], &RadialChartConfig::default()).is_none());
    assert_untouched(&container, &tooltip);
}

#[test]
fn empty_input_leaves_a_previous_chart_in_place() {
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);

    let data = vec![chart_gallery::charts::BarDatum::new("Berlin", 42.0)];
    let handle = render_bar_chart(&ctx, &data, &BarChartConfig::default()).expect("chart rendered");
    let nodes = container.len();

    assert!(render_bar_chart(&ctx, &[], &BarChartConfig::default()).is_none());
    assert_eq!(container.len(), nodes);
    assert!(handle.is_active());
}
