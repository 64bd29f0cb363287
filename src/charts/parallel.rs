use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::core::{ChartLayout, DEFAULT_HEADROOM, LinearScale, Margins, PointScale, finite_or_zero};
use crate::palette::Palette;
use crate::render::{
    NodeDraft, NodeRole, NodeStyle, PathPrimitive, SceneBuilder, SceneLayer, Shape, TextHAlign,
    Transition, TransitionKind,
};

use super::axis::{draw_title, draw_value_axis_left};
use super::context::RenderContext;
use super::handle::{
    AxisAnchor, AxisLookup, ChartHandle, ChartInstance, ChartKind, HoverEffect, LookupGeometry,
    MarkBinding, TooltipContent,
};
use super::legend::{LegendItem, LegendPlacement, draw_legend};
use super::style::{ChartStyle, escape_html, tooltip_html};
use super::{begin_render, log_empty};

pub const PARALLEL_DURATION_MS: u32 = 1_000;
const AXIS_TICK_LENGTH_PX: f64 = 4.0;

/// One measuring station with its metric readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    pub network: String,
    pub code: String,
    pub name: String,
    pub environment: String,
    pub station_type: String,
    pub values: IndexMap<String, f64>,
}

/// Metric keys across all records in first-seen order.
#[must_use]
pub fn metric_keys(records: &[StationRecord]) -> Vec<String> {
    let keys: IndexSet<&str> = records
        .iter()
        .flat_map(|record| record.values.keys().map(String::as_str))
        .collect();
    keys.into_iter().map(str::to_owned).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelChartConfig {
    pub layout: ChartLayout,
    /// Axis order; `None` uses the metrics found in the data.
    pub metrics: Option<Vec<String>>,
    pub headroom: f64,
    pub duration_ms: u32,
    pub stroke_width: f64,
    pub hover_stroke_width: f64,
    pub base_opacity: f64,
    pub palette: Palette,
    pub legend: LegendPlacement,
    pub style: ChartStyle,
}

impl Default for ParallelChartConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::new(760.0, 420.0)
                .with_margins(Margins::new(64.0, 48.0, 24.0, 48.0)),
            metrics: None,
            headroom: DEFAULT_HEADROOM,
            duration_ms: PARALLEL_DURATION_MS,
            stroke_width: 1.8,
            hover_stroke_width: 3.5,
            base_opacity: 0.7,
            palette: Palette::networks(),
            legend: LegendPlacement::TopRight,
            style: ChartStyle::default(),
        }
    }
}

/// One vertical axis per metric, one path per station.
///
/// Hovering a station dims the others; its tooltip follows the axis closest
/// to the pointer.
pub fn render_parallel_chart(
    ctx: &RenderContext<'_>,
    records: &[StationRecord],
    config: &ParallelChartConfig,
) -> Option<ChartHandle> {
    let kind = ChartKind::ParallelCoordinates;
    let metrics: Vec<String> = config
        .metrics
        .clone()
        .unwrap_or_else(|| metric_keys(records))
        .into_iter()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();
    if records.is_empty() || metrics.is_empty() {
        log_empty(kind);
        return None;
    }
    let (owner, layout) = begin_render(ctx, kind, config.layout)?;
    let style = &config.style;

    let x = PointScale::new(metrics.iter(), (layout.plot_left(), layout.plot_right()), 0.0);
    let axes: Vec<(&str, f64, LinearScale)> = metrics
        .iter()
        .enumerate()
        .filter_map(|(index, metric)| {
            let axis_x = x.position_at(index)?;
            let scale = LinearScale::from_values_with_headroom(
                records.iter().filter_map(|record| record.values.get(metric).copied()),
                config.headroom,
                (layout.plot_bottom(), layout.plot_top()),
            );
            Some((metric.as_str(), axis_x, scale))
        })
        .collect();
    let metric_labels: Vec<String> = axes
        .iter()
        .map(|(metric, _, _)| {
            ctx.text(&format!("charts.parallel.metrics.{metric}"), metric, json!({}))
        })
        .collect();

    let mut builder = SceneBuilder::new(ctx.container, owner);
    let mut instance = ChartInstance::new(kind, owner, ctx.container, ctx.tooltip, ctx.export)
        .with_mark_dimming();

    for ((_, axis_x, scale), label) in axes.iter().zip(&metric_labels) {
        draw_value_axis_left(
            &mut builder,
            ctx,
            style,
            *scale,
            *axis_x,
            axis_x + AXIS_TICK_LENGTH_PX,
        );
        draw_title(
            &mut builder,
            style,
            label.clone(),
            *axis_x,
            layout.plot_top() - 12.0,
            TextHAlign::Center,
        );
    }

    let networks: IndexSet<&str> = records.iter().map(|record| record.network.as_str()).collect();
    let network_label = |network: &str| ctx.text(
        &format!("charts.parallel.networks.{network}"),
        network,
        json!({}),
    );
    for record in records {
        let index = networks.get_index_of(record.network.as_str()).unwrap_or(0);
        let color = config.palette.resolve(&record.network, index, networks.len());
        let mut coords = Vec::with_capacity(axes.len());
        let mut anchors = Vec::with_capacity(axes.len());
        for ((metric, axis_x, scale), label) in axes.iter().zip(&metric_labels) {
            let Some(value) = record.values.get(*metric).copied() else {
                continue;
            };
            coords.push((*axis_x, scale.map(value)));
            anchors.push(AxisAnchor {
                position: *axis_x,
                html: escape_html(&format!("{label}: {}", ctx.value(finite_or_zero(value)))),
            });
        }
        if coords.is_empty() {
            continue;
        }

        let path = PathPrimitive::stroked(
            PathPrimitive::polyline(&coords),
            color,
            config.stroke_width,
        );
        let length = path.length();
        let id = builder.add(
            NodeDraft::new(SceneLayer::Marks, Shape::Path(path))
                .with_role(NodeRole::mark_in_group(record.code.clone(), record.network.clone()))
                .with_opacity(config.base_opacity)
                .with_transition(Transition::new(
                    TransitionKind::StrokeReveal { length },
                    config.duration_ms,
                )),
        );
        let header = tooltip_html(
            &record.name,
            &[
                network_label(&record.network),
                format!("{} · {}", record.environment, record.station_type),
            ],
        );
        instance.bind(
            id,
            MarkBinding::new(
                record.code.clone(),
                TooltipContent::NearestAxis(AxisLookup {
                    header,
                    anchors,
                    geometry: LookupGeometry::Horizontal,
                }),
            )
            .with_legend_key(record.network.clone())
            .with_base(NodeStyle::with_opacity(config.base_opacity))
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
        layout.plot_top() * 0.35,
    ) {
        instance.bind_legend(id, key);
    }

    let committed = builder.commit();
    debug!(
        chart = ?kind,
        owner = owner.0,
        stations = records.len(),
        metrics = axes.len(),
        nodes = committed,
        "parallel coordinates rendered"
    );
    Some(ChartHandle::new(instance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, values: &[(&str, f64)]) -> StationRecord {
        StationRecord {
            network: "urban".to_owned(),
            code: code.to_owned(),
            name: code.to_owned(),
            environment: "urban".to_owned(),
            station_type: "traffic".to_owned(),
            values: values.iter().map(|(key, value)| ((*key).to_owned(), *value)).collect(),
        }
    }

    #[test]
    fn metric_keys_keep_first_seen_order() {
        let records = vec![
            record("A", &[("no2", 1.0), ("pm10", 2.0)]),
            record("B", &[("o3", 3.0), ("no2", 4.0)]),
        ];
        assert_eq!(metric_keys(&records), vec!["no2", "pm10", "o3"]);
    }
}
