use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::core::{ChartLayout, DEFAULT_HEADROOM, LinearScale, PointScale, finite_or_zero};
use crate::palette::Palette;
use crate::render::{
    CirclePrimitive, Color, NodeDraft, NodeRole, Paint, PathPrimitive, SceneBuilder, SceneLayer,
    Shape, Transition, TransitionKind,
};

use super::axis::{draw_category_axis_bottom, draw_value_axis_left};
use super::context::RenderContext;
use super::handle::{
    ChartHandle, ChartInstance, ChartKind, HoverEffect, MarkBinding, TooltipContent,
};
use super::legend::{LegendItem, LegendPlacement, draw_legend};
use super::style::{ChartStyle, tooltip_html};
use super::{begin_render, log_empty};

pub const LINE_DURATION_MS: u32 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    /// Ordinal x category, e.g. a year.
    pub x: String,
    pub value: f64,
}

impl LinePoint {
    #[must_use]
    pub fn new(x: impl Into<String>, value: f64) -> Self {
        Self { x: x.into(), value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub key: String,
    pub points: Vec<LinePoint>,
}

impl LineSeries {
    #[must_use]
    pub fn new(key: impl Into<String>, points: Vec<LinePoint>) -> Self {
        Self {
            key: key.into(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineChartConfig {
    pub layout: ChartLayout,
    pub headroom: f64,
    /// Outer padding of the x point scale, in steps.
    pub point_padding: f64,
    pub duration_ms: u32,
    pub stroke_width: f64,
    pub hover_stroke_width: f64,
    pub point_radius: f64,
    pub palette: Palette,
    pub legend: LegendPlacement,
    pub style: ChartStyle,
}

impl Default for LineChartConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::default(),
            headroom: DEFAULT_HEADROOM,
            point_padding: 0.5,
            duration_ms: LINE_DURATION_MS,
            stroke_width: 2.5,
            hover_stroke_width: 4.0,
            point_radius: 4.0,
            palette: Palette::cities(),
            legend: LegendPlacement::TopRight,
            style: ChartStyle::default(),
        }
    }
}

/// Renders one path per series over a shared point x-scale and y-scale.
pub fn render_line_chart(
    ctx: &RenderContext<'_>,
    series: &[LineSeries],
    config: &LineChartConfig,
) -> Option<ChartHandle> {
    let kind = ChartKind::Line;
    if series.iter().all(|series| series.points.is_empty()) {
        log_empty(kind);
        return None;
    }
    let (owner, layout) = begin_render(ctx, kind, config.layout)?;
    let style = &config.style;

    let categories: IndexSet<&str> = series
        .iter()
        .flat_map(|series| series.points.iter().map(|point| point.x.as_str()))
        .collect();
    let x = PointScale::new(
        categories.iter().copied(),
        (layout.plot_left(), layout.plot_right()),
        config.point_padding,
    );
    let y = LinearScale::from_values_with_headroom(
        series
            .iter()
            .flat_map(|series| series.points.iter().map(|point| point.value)),
        config.headroom,
        (layout.plot_bottom(), layout.plot_top()),
    );

    let mut builder = SceneBuilder::new(ctx.container, owner);
    let mut instance = ChartInstance::new(kind, owner, ctx.container, ctx.tooltip, ctx.export)
        .with_mark_dimming();

    draw_value_axis_left(&mut builder, ctx, style, y, layout.plot_left(), layout.plot_right());
    let ticks: Vec<(String, f64)> = categories
        .iter()
        .filter_map(|category| x.position(category).map(|px| (ctx.label(category), px)))
        .collect();
    draw_category_axis_bottom(
        &mut builder,
        style,
        &ticks,
        layout.plot_bottom(),
        (layout.plot_left(), layout.plot_right()),
    );

    let mut legend_items = Vec::with_capacity(series.len());
    for (index, line) in series.iter().enumerate() {
        let color = config.palette.resolve(&line.key, index, series.len());
        let label = ctx.label(&line.key);
        legend_items.push(LegendItem {
            key: line.key.clone(),
            label: label.clone(),
            color,
        });
        if line.points.is_empty() {
            continue;
        }

        let points: Vec<(f64, f64, &LinePoint)> = line
            .points
            .iter()
            .filter_map(|point| x.position(&point.x).map(|px| (px, y.map(point.value), point)))
            .collect();
        let coords: Vec<(f64, f64)> = points.iter().map(|&(px, py, _)| (px, py)).collect();
        let path = PathPrimitive::stroked(
            PathPrimitive::polyline(&coords),
            color,
            config.stroke_width,
        );
        let length = path.length();
        let summary = ctx.text(
            "charts.line.series",
            "{{count}} points",
            json!({ "series": label, "count": points.len() }),
        );
        let path_id = builder.add(
            NodeDraft::new(SceneLayer::Marks, Shape::Path(path))
                .with_role(NodeRole::mark(line.key.clone()))
                .with_transition(Transition::new(
                    TransitionKind::StrokeReveal { length },
                    config.duration_ms,
                )),
        );
        instance.bind(
            path_id,
            MarkBinding::new(
                line.key.clone(),
                TooltipContent::Static(tooltip_html(&label, &[summary])),
            )
            .with_legend_key(line.key.clone())
            .with_hover(HoverEffect::with_stroke(config.hover_stroke_width)),
        );

        for &(px, py, point) in &points {
            let key = format!("{}:{}", line.key, point.x);
            let body = ctx.text(
                "charts.line.point",
                "{{x}}: {{value}}",
                json!({
                    "series": label,
                    "x": ctx.label(&point.x),
                    "value": ctx.value(finite_or_zero(point.value)),
                }),
            );
            let circle = CirclePrimitive::new(px, py, config.point_radius, Paint::Solid(color))
                .with_stroke(1.5, Color::rgb(1.0, 1.0, 1.0));
            let id = builder.add(
                NodeDraft::new(SceneLayer::Marks, Shape::Circle(circle))
                    .with_role(NodeRole::mark_in_group(key.clone(), line.key.clone()))
                    .with_transition(
                        Transition::new(TransitionKind::ScaleIn, config.duration_ms / 3)
                            .with_delay(config.duration_ms),
                    ),
            );
            instance.bind(
                id,
                MarkBinding::new(key, TooltipContent::Static(tooltip_html(&label, &[body])))
                    .in_group(line.key.clone())
                    .with_legend_key(line.key.clone())
                    .with_hover(HoverEffect {
                        opacity: 1.0,
                        stroke_width: Some(2.5),
                        raise: true,
                    }),
            );
        }
    }

    for (id, key) in draw_legend(
        &mut builder,
        style,
        &legend_items,
        config.legend,
        (layout.plot_left(), layout.plot_right()),
        layout.plot_top() * 0.5,
    ) {
        instance.bind_legend(id, key);
    }

    let committed = builder.commit();
    debug!(
        chart = ?kind,
        owner = owner.0,
        series = series.len(),
        nodes = committed,
        "line chart rendered"
    );
    Some(ChartHandle::new(instance))
}
