use chart_gallery::charts::{
    BarChartConfig, BarDatum, DefaultTranslator, RenderContext, layout_bars, render_bar_chart,
};
use chart_gallery::core::{LinearScale, Viewport, ticks};
use chart_gallery::render::{Container, SvgRenderer, Renderer};
use chart_gallery::interaction::Tooltip;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn cities(count: usize) -> Vec<BarDatum> {
    (0..count)
        .map(|i| BarDatum::new(format!("city-{i}"), (i * 37 % 101) as f64 + 0.5))
        .collect()
}

fn bench_linear_scale_map(c: &mut Criterion) {
    let scale = LinearScale::with_headroom(9_876.0, 1.1, (400.0, 20.0));

    c.bench_function("linear_scale_map_1k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..1_000 {
                acc += scale.map(black_box(i as f64 * 9.8));
            }
            acc
        })
    });
}

fn bench_ticks(c: &mut Criterion) {
    c.bench_function("nice_ticks", |b| {
        b.iter(|| ticks(black_box(0.0), black_box(10_863.0), black_box(6)))
    });
}

fn bench_layout_bars_500(c: &mut Criterion) {
    let data = cities(500);
    let config = BarChartConfig::default();

    c.bench_function("layout_bars_500", |b| {
        b.iter(|| layout_bars(black_box(&data), black_box(&config)))
    });
}

fn bench_render_and_serialize_bar_chart(c: &mut Criterion) {
    let data = cities(40);
    let config = BarChartConfig::default();
    let container = Container::new(Viewport::new(720, 420));
    let tooltip = Tooltip::new();
    let ctx = RenderContext::new(&container, &tooltip, &DefaultTranslator);

    c.bench_function("render_bar_chart_40", |b| {
        b.iter(|| {
            render_bar_chart(black_box(&ctx), black_box(&data), &config).expect("chart rendered")
        })
    });

    render_bar_chart(&ctx, &data, &config).expect("chart rendered");
    let frame = container.frame();
    c.bench_function("svg_bar_chart_40", |b| {
        b.iter(|| {
            let mut renderer = SvgRenderer::default();
            renderer.render(black_box(&frame)).expect("svg render");
            renderer.into_output()
        })
    });
}

criterion_group!(
    benches,
    bench_linear_scale_map,
    bench_ticks,
    bench_layout_bars_500,
    bench_render_and_serialize_bar_chart
);
criterion_main!(benches);
