//! "Flawed" donut: one ring per day with a misleading colour/legend mapping.
//!
//! The chart is a teaching counter-example and its rules are reproduced
//! exactly:
//! - rings follow first-seen day order, innermost first;
//! - slices within a ring are sorted by descending value, ties in input order;
//! - a slice takes the colour of the legend entry at its *position* in the
//!   ring, not the colour of its own segment;
//! - the legend lists segments in first-seen order, coloured by legend
//!   position.
//!
//! Tooltips still report the true day, segment and value.

use std::cmp::Reverse;
use std::f64::consts::{FRAC_PI_2, TAU};

use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::core::{ChartLayout, Margins, finite_or_zero};
use crate::palette::Palette;
use crate::render::{
    Color, NodeDraft, NodeRole, Paint, PathCommand, PathPrimitive, SceneBuilder, SceneLayer, Shape,
    TextHAlign, TextPrimitive, Transition, TransitionKind,
};

use super::context::{RenderContext, format_day_key};
use super::handle::{
    ChartHandle, ChartInstance, ChartKind, HoverEffect, MarkBinding, TooltipContent,
};
use super::legend::{LegendItem, LegendPlacement, draw_legend};
use super::style::{ChartStyle, tooltip_html};
use super::{begin_render, log_empty};

pub const DONUT_DURATION_MS: u32 = 900;
const RING_STAGGER_MS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutDatum {
    pub day: String,
    /// Time-of-day bucket or similar sub-category.
    pub segment: String,
    pub value: f64,
}

impl DonutDatum {
    #[must_use]
    pub fn new(day: impl Into<String>, segment: impl Into<String>, value: f64) -> Self {
        Self {
            day: day.into(),
            segment: segment.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonutChartConfig {
    pub layout: ChartLayout,
    /// Radius of the empty centre relative to the outer radius.
    pub hole_ratio: f64,
    pub ring_gap_px: f64,
    pub duration_ms: u32,
    pub palette: Palette,
    pub legend: LegendPlacement,
    /// chrono format applied to ISO day keys in ring labels and tooltips.
    pub day_format: String,
    pub style: ChartStyle,
}

impl Default for DonutChartConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::new(480.0, 480.0)
                .with_margins(Margins::new(40.0, 16.0, 16.0, 16.0)),
            hole_ratio: 0.3,
            ring_gap_px: 2.0,
            duration_ms: DONUT_DURATION_MS,
            palette: Palette::time_of_day(),
            legend: LegendPlacement::TopLeft,
            day_format: "%a %d.%m.".to_owned(),
            style: ChartStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutSlice {
    pub day: String,
    pub segment: String,
    pub value: f64,
    /// Rank within the ring after sorting.
    pub position: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutRing {
    pub day: String,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub slices: Vec<DonutSlice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutLayout {
    pub center: (f64, f64),
    pub rings: Vec<DonutRing>,
    /// Segment keys in first-seen order with the colour shown in the legend.
    pub legend: Vec<(String, Color)>,
}

#[must_use]
pub fn donut_layout(data: &[DonutDatum], config: &DonutChartConfig) -> DonutLayout {
    let layout = config.layout;
    let days: IndexSet<&str> = data.iter().map(|datum| datum.day.as_str()).collect();
    let segments: IndexSet<&str> = data.iter().map(|datum| datum.segment.as_str()).collect();
    let legend: Vec<(String, Color)> = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let color = config.palette.resolve(segment, index, segments.len());
            ((*segment).to_owned(), color)
        })
        .collect();

    let outer = (layout.plot_width().min(layout.plot_height()) * 0.5).max(0.0);
    let hole = outer * config.hole_ratio.clamp(0.0, 0.95);
    let thickness = if days.is_empty() {
        0.0
    } else {
        (outer - hole) / days.len() as f64
    };

    let rings = days
        .iter()
        .enumerate()
        .map(|(ring_index, day)| {
            let mut entries: Vec<(&DonutDatum, f64)> = data
                .iter()
                .filter(|datum| datum.day == *day)
                .map(|datum| (datum, finite_or_zero(datum.value).max(0.0)))
                .collect();
            entries.sort_by_key(|&(_, value)| Reverse(OrderedFloat(value)));
            let total: f64 = entries.iter().map(|&(_, value)| value).sum();

            let mut angle = -FRAC_PI_2;
            let slices = entries
                .iter()
                .enumerate()
                .map(|(position, &(datum, value))| {
                    let span = if total > 0.0 { TAU * value / total } else { 0.0 };
                    let slice = DonutSlice {
                        day: datum.day.clone(),
                        segment: datum.segment.clone(),
                        value,
                        position,
                        start_angle: angle,
                        end_angle: angle + span,
                        color: legend
                            .get(position % legend.len().max(1))
                            .map_or_else(
                                || config.palette.resolve(&datum.segment, position, 1),
                                |entry| entry.1,
                            ),
                    };
                    angle += span;
                    slice
                })
                .collect();

            let inner_radius = hole + thickness * ring_index as f64;
            DonutRing {
                day: (*day).to_owned(),
                inner_radius,
                outer_radius: (inner_radius + thickness - config.ring_gap_px).max(inner_radius),
                slices,
            }
        })
        .collect();

    DonutLayout {
        center: layout.center(),
        rings,
        legend,
    }
}

fn slice_commands(center: (f64, f64), ring: &DonutRing, slice: &DonutSlice) -> Vec<PathCommand> {
    vec![
        PathCommand::Arc {
            cx: center.0,
            cy: center.1,
            radius: ring.outer_radius,
            start_angle: slice.start_angle,
            end_angle: slice.end_angle,
        },
        PathCommand::Arc {
            cx: center.0,
            cy: center.1,
            radius: ring.inner_radius,
            start_angle: slice.end_angle,
            end_angle: slice.start_angle,
        },
        PathCommand::Close,
    ]
}

/// Renders the flawed day-ring donut.
pub fn render_donut_chart(
    ctx: &RenderContext<'_>,
    data: &[DonutDatum],
    config: &DonutChartConfig,
) -> Option<ChartHandle> {
    let kind = ChartKind::Donut;
    if data.is_empty() {
        log_empty(kind);
        return None;
    }
    let (owner, layout) = begin_render(ctx, kind, config.layout)?;
    let config = &DonutChartConfig {
        layout,
        ..config.clone()
    };
    let style = &config.style;
    let geometry = donut_layout(data, config);
    let center = geometry.center;

    let mut builder = SceneBuilder::new(ctx.container, owner);
    let mut instance = ChartInstance::new(kind, owner, ctx.container, ctx.tooltip, ctx.export)
        .with_mark_dimming();
    let segment_label = |segment: &str| {
        ctx.text(
            &format!("charts.donut.segments.{segment}"),
            &ctx.label(segment),
            json!({}),
        )
    };

    for (ring_index, ring) in geometry.rings.iter().enumerate() {
        let day_label = format_day_key(&ring.day, &config.day_format);
        let sweep = Transition::new(
            TransitionKind::Sweep {
                origin_angle: -FRAC_PI_2,
            },
            config.duration_ms,
        )
        .with_delay(RING_STAGGER_MS.saturating_mul(ring_index as u32));
        for slice in &ring.slices {
            if slice.end_angle <= slice.start_angle {
                continue;
            }
            let key = format!("{}:{}", slice.day, slice.segment);
            let path = PathPrimitive::filled(
                slice_commands(center, ring, slice),
                Paint::Solid(slice.color),
            )
            .with_stroke(Color::rgb(1.0, 1.0, 1.0), 1.0);
            let id = builder.add(
                NodeDraft::new(SceneLayer::Marks, Shape::Path(path))
                    .with_role(NodeRole::mark_in_group(key.clone(), slice.segment.clone()))
                    .with_transition(sweep.clone()),
            );
            let body = ctx.text(
                "charts.donut.tooltip",
                "{{segment}}: {{value}}",
                json!({
                    "day": day_label,
                    "segment": segment_label(&slice.segment),
                    "value": ctx.value(slice.value),
                }),
            );
            instance.bind(
                id,
                MarkBinding::new(key, TooltipContent::Static(tooltip_html(&day_label, &[body])))
                    .with_legend_key(slice.segment.clone())
                    .with_hover(HoverEffect {
                        opacity: 1.0,
                        stroke_width: Some(2.0),
                        raise: true,
                    }),
            );
        }

        let mid = (ring.inner_radius + ring.outer_radius) * 0.5;
        builder.add_text(
            NodeDraft::new(
                SceneLayer::Labels,
                Shape::Text(TextPrimitive::new(
                    day_label,
                    center.0 + 4.0,
                    center.1 - mid + style.tick_font_size_px * 0.35,
                    style.tick_font_size_px,
                    style.axis_label_color,
                    TextHAlign::Left,
                )),
            )
            .with_role(NodeRole::Label)
            .with_transition(
                Transition::new(TransitionKind::FadeIn, config.duration_ms / 2)
                    .with_delay(config.duration_ms),
            ),
        );
    }

    let legend_items: Vec<LegendItem> = geometry
        .legend
        .iter()
        .map(|(segment, color)| LegendItem {
            key: segment.clone(),
            label: segment_label(segment),
            color: *color,
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
        rings = geometry.rings.len(),
        nodes = committed,
        "donut chart rendered"
    );
    Some(ChartHandle::new(instance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_colour_follows_position_not_segment() {
        let data = vec![
            DonutDatum::new("2024-05-01", "morning", 1.0),
            DonutDatum::new("2024-05-01", "evening", 5.0),
        ];
        let layout = donut_layout(&data, &DonutChartConfig::default());
        let ring = &layout.rings[0];
        assert_eq!(ring.slices[0].segment, "evening");
        // Largest slice wears the first legend colour, which the legend assigns to "morning".
        assert_eq!(ring.slices[0].color, layout.legend[0].1);
        assert_eq!(layout.legend[0].0, "morning");
    }
}
