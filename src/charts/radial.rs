use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::core::{
    ChartLayout, Margins, RADIAL_DOMAIN_MAX, RadialScale, axis_angle, finite_or_zero,
    polar_to_cartesian,
};
use crate::palette::Palette;
use crate::render::{
    CirclePrimitive, Color, LinePrimitive, NodeDraft, NodeRole, Paint, PathPrimitive, SceneBuilder,
    SceneLayer, Shape, TextHAlign, TextPrimitive, Transition, TransitionKind,
};

use super::context::RenderContext;
use super::handle::{
    AxisAnchor, AxisLookup, ChartHandle, ChartInstance, ChartKind, HoverEffect, LookupGeometry,
    MarkBinding, TooltipContent,
};
use super::legend::{LegendItem, LegendPlacement, draw_legend};
use super::parallel::{StationRecord, metric_keys};
use super::style::{ChartStyle, escape_html, tooltip_html};
use super::{begin_render, log_empty};

pub const RADIAL_DURATION_MS: u32 = 900;
const RING_STEPS: [f64; 5] = [2.0, 4.0, 6.0, 8.0, 10.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialChartConfig {
    pub layout: ChartLayout,
    /// Axis order; `None` uses the metrics found in the data.
    pub metrics: Option<Vec<String>>,
    pub duration_ms: u32,
    /// Space kept between the outer ring and the plot edge for metric labels.
    pub label_margin_px: f64,
    pub fill_alpha: f64,
    pub stroke_width: f64,
    pub hover_stroke_width: f64,
    pub palette: Palette,
    pub legend: LegendPlacement,
    pub style: ChartStyle,
}

impl Default for RadialChartConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::new(520.0, 520.0)
                .with_margins(Margins::new(48.0, 24.0, 24.0, 24.0)),
            metrics: None,
            duration_ms: RADIAL_DURATION_MS,
            label_margin_px: 24.0,
            fill_alpha: 0.15,
            stroke_width: 2.0,
            hover_stroke_width: 3.5,
            palette: Palette::networks(),
            legend: LegendPlacement::TopLeft,
            style: ChartStyle::default(),
        }
    }
}

/// Star plot of normalized `0..=10` scores, one closed polygon per station.
///
/// Values outside the shared domain are clamped for geometry; tooltips keep
/// the raw reading.
pub fn render_radial_chart(
    ctx: &RenderContext<'_>,
    records: &[StationRecord],
    config: &RadialChartConfig,
) -> Option<ChartHandle> {
    let kind = ChartKind::Radial;
    let metrics = {
        let requested = config.metrics.clone().unwrap_or_else(|| metric_keys(records));
        let unique: IndexSet<String> = requested.into_iter().collect();
        unique.into_iter().collect::<Vec<_>>()
    };
    if records.is_empty() || metrics.is_empty() {
        log_empty(kind);
        return None;
    }
    let (owner, layout) = begin_render(ctx, kind, config.layout)?;
    let style = &config.style;

    let center = layout.center();
    let radius =
        (layout.plot_width().min(layout.plot_height()) * 0.5 - config.label_margin_px).max(0.0);
    if radius == 0.0 {
        warn!(chart = ?kind, "plot too small for the radial scale");
    }
    let scale = RadialScale::new(radius);
    let count = metrics.len();

    let mut builder = SceneBuilder::new(ctx.container, owner);
    let mut instance = ChartInstance::new(kind, owner, ctx.container, ctx.tooltip, ctx.export)
        .with_mark_dimming();

    for step in RING_STEPS {
        let ring = CirclePrimitive::new(
            center.0,
            center.1,
            scale.map(step),
            Paint::Solid(Color::rgba(0.0, 0.0, 0.0, 0.0)),
        )
        .with_stroke(style.grid_line_width, style.grid_line_color);
        builder.add_shape(SceneLayer::Grid, Shape::Circle(ring));
        let (lx, ly) = polar_to_cartesian(center, axis_angle(0, count), scale.map(step));
        builder.add_text(
            NodeDraft::new(
                SceneLayer::Axis,
                Shape::Text(TextPrimitive::new(
                    ctx.value(step),
                    lx + 4.0,
                    ly + style.tick_font_size_px * 0.35,
                    style.tick_font_size_px,
                    style.axis_label_color,
                    TextHAlign::Left,
                )),
            )
            .with_role(NodeRole::Label),
        );
    }

    let metric_labels: Vec<String> = metrics
        .iter()
        .map(|metric| ctx.text(&format!("charts.radial.metrics.{metric}"), metric, json!({})))
        .collect();
    for (index, label) in metric_labels.iter().enumerate() {
        let angle = axis_angle(index, count);
        let (ex, ey) = polar_to_cartesian(center, angle, radius);
        builder.add_shape(
            SceneLayer::Axis,
            Shape::Line(LinePrimitive::new(
                center.0,
                center.1,
                ex,
                ey,
                style.axis_line_width,
                style.axis_line_color,
            )),
        );
        let (lx, ly) = polar_to_cartesian(center, angle, radius + config.label_margin_px * 0.5);
        let h_align = if (lx - center.0).abs() < 1.0 {
            TextHAlign::Center
        } else if lx > center.0 {
            TextHAlign::Left
        } else {
            TextHAlign::Right
        };
        builder.add_text(
            NodeDraft::new(
                SceneLayer::Axis,
                Shape::Text(TextPrimitive::new(
                    label.clone(),
                    lx,
                    ly + style.label_font_size_px * 0.35,
                    style.label_font_size_px,
                    style.axis_label_color,
                    h_align,
                )),
            )
            .with_role(NodeRole::Label),
        );
    }

    let networks: IndexSet<&str> = records.iter().map(|record| record.network.as_str()).collect();
    let network_label = |network: &str| ctx.text(
        &format!("charts.radial.networks.{network}"),
        network,
        json!({}),
    );
    for record in records {
        let index = networks.get_index_of(record.network.as_str()).unwrap_or(0);
        let color = config.palette.resolve(&record.network, index, networks.len());
        let mut points = Vec::with_capacity(count);
        let mut anchors = Vec::with_capacity(count);
        for (axis, (metric, label)) in metrics.iter().zip(&metric_labels).enumerate() {
            let raw = finite_or_zero(record.values.get(metric).copied().unwrap_or_default());
            let clamped = raw.clamp(0.0, RADIAL_DOMAIN_MAX);
            points.push(polar_to_cartesian(center, axis_angle(axis, count), scale.map(clamped)));
            anchors.push(AxisAnchor {
                position: 0.0,
                html: escape_html(&format!("{label}: {}", ctx.value(raw))),
            });
        }

        let polygon = PathPrimitive::filled(
            PathPrimitive::polygon(&points),
            Paint::Solid(color.with_alpha(config.fill_alpha)),
        )
        .with_stroke(color, config.stroke_width);
        let id = builder.add(
            NodeDraft::new(SceneLayer::Marks, Shape::Path(polygon))
                .with_role(NodeRole::mark_in_group(record.code.clone(), record.network.clone()))
                .with_transition(Transition::new(TransitionKind::FadeIn, config.duration_ms)),
        );
        let header = tooltip_html(&record.name, &[network_label(&record.network)]);
        instance.bind(
            id,
            MarkBinding::new(
                record.code.clone(),
                TooltipContent::NearestAxis(AxisLookup {
                    header,
                    anchors,
                    geometry: LookupGeometry::Angular { center },
                }),
            )
            .with_legend_key(record.network.clone())
            .with_hover(HoverEffect::with_stroke(config.hover_stroke_width)),
        );
    }

    let legend_items: Vec<LegendItem> = networks
        .iter()
        .enumerate()
        .map(|(index, network)| LegendItem {
            key: (*network).to_owned(),
            label: network_label(network),
            color: config.palette.resolve(network, index, networks.len()),
        })
        .collect();
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
        stations = records.len(),
        metrics = count,
        nodes = committed,
        "radial chart rendered"
    );
    Some(ChartHandle::new(instance))
}
