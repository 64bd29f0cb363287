use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::core::{ChartLayout, DEFAULT_HEADROOM, LinearScale, Margins, PointScale, finite_or_zero};
use crate::palette::Palette;
use crate::render::{
    CirclePrimitive, Color, NodeDraft, NodeRole, Paint, PathPrimitive, SceneBuilder, SceneLayer,
    Shape, TextHAlign, Transition, TransitionKind,
};

use super::axis::{draw_category_axis_bottom, draw_title, draw_value_axis_left};
use super::context::{RenderContext, format_day_key};
use super::handle::{
    ChartHandle, ChartInstance, ChartKind, HoverEffect, MarkBinding, TooltipContent,
};
use super::legend::{LegendItem, LegendPlacement, draw_legend};
use super::style::{ChartStyle, tooltip_html};
use super::{begin_render, log_empty};

pub const MULTI_BAND_DURATION_MS: u32 = 900;
const PANEL_TITLE_SPACE_PX: f64 = 18.0;

/// One observation: `series` measured on `day` within panel `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSample {
    pub day: String,
    pub mode: String,
    pub series: String,
    pub value: f64,
}

impl BandSample {
    #[must_use]
    pub fn new(
        day: impl Into<String>,
        mode: impl Into<String>,
        series: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            day: day.into(),
            mode: mode.into(),
            series: series.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiBandChartConfig {
    pub layout: ChartLayout,
    pub panel_gap_px: f64,
    pub headroom: f64,
    pub point_padding: f64,
    pub duration_ms: u32,
    pub stroke_width: f64,
    pub hover_stroke_width: f64,
    pub point_radius: f64,
    pub palette: Palette,
    pub legend: LegendPlacement,
    pub day_format: String,
    pub style: ChartStyle,
}

impl Default for MultiBandChartConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::new(720.0, 560.0)
                .with_margins(Margins::new(40.0, 24.0, 40.0, 56.0)),
            panel_gap_px: 28.0,
            headroom: DEFAULT_HEADROOM,
            point_padding: 0.3,
            duration_ms: MULTI_BAND_DURATION_MS,
            stroke_width: 2.0,
            hover_stroke_width: 3.5,
            point_radius: 3.0,
            palette: Palette::cities(),
            legend: LegendPlacement::TopRight,
            day_format: "%d.%m.".to_owned(),
            style: ChartStyle::default(),
        }
    }
}

/// Pixel range of a panel's value axis, leaving room for the panel title.
///
/// The title space shrinks on short panels so the range never flips.
fn panel_value_range(top: f64, bottom: f64) -> (f64, f64) {
    let title_space = PANEL_TITLE_SPACE_PX.min((bottom - top).max(0.0) * 0.5);
    (bottom, top + title_space)
}

/// Vertical extent of panel `index` out of `count`.
fn panel_bounds(layout: ChartLayout, gap: f64, index: usize, count: usize) -> (f64, f64) {
    let count = count.max(1);
    let mut gap = gap.max(0.0);
    let mut height = (layout.plot_height() - gap * (count - 1) as f64) / count as f64;
    if height <= PANEL_TITLE_SPACE_PX {
        gap = 0.0;
        height = layout.plot_height() / count as f64;
    }
    let top = layout.plot_top() + index as f64 * (height + gap);
    (top, top + height)
}

/// Stacked panels, one per mode, sharing the day axis and the series legend.
///
/// Each panel scales its own y-axis to its own maximum.
pub fn render_multi_band_chart(
    ctx: &RenderContext<'_>,
    data: &[BandSample],
    config: &MultiBandChartConfig,
) -> Option<ChartHandle> {
    let kind = ChartKind::MultiBand;
    if data.is_empty() {
        log_empty(kind);
        return None;
    }
    let (owner, layout) = begin_render(ctx, kind, config.layout)?;
    let style = &config.style;

    let days: IndexSet<&str> = data.iter().map(|sample| sample.day.as_str()).collect();
    let modes: IndexSet<&str> = data.iter().map(|sample| sample.mode.as_str()).collect();
    let series: IndexSet<&str> = data.iter().map(|sample| sample.series.as_str()).collect();
    let colors: IndexMap<&str, Color> = series
        .iter()
        .enumerate()
        .map(|(index, key)| (*key, config.palette.resolve(key, index, series.len())))
        .collect();
    let x = PointScale::new(
        days.iter().copied(),
        (layout.plot_left(), layout.plot_right()),
        config.point_padding,
    );

    let mut builder = SceneBuilder::new(ctx.container, owner);
    let mut instance = ChartInstance::new(kind, owner, ctx.container, ctx.tooltip, ctx.export)
        .with_mark_dimming();

    for (panel_index, mode) in modes.iter().enumerate() {
        let (top, bottom) = panel_bounds(layout, config.panel_gap_px, panel_index, modes.len());
        let samples: Vec<&BandSample> = data.iter().filter(|sample| sample.mode == *mode).collect();
        let y = LinearScale::from_values_with_headroom(
            samples.iter().map(|sample| sample.value),
            config.headroom,
            panel_value_range(top, bottom),
        );
        let mode_label = ctx.text(
            &format!("charts.multiBand.modes.{mode}"),
            &ctx.label(mode),
            json!({}),
        );

        draw_value_axis_left(&mut builder, ctx, style, y, layout.plot_left(), layout.plot_right());
        let day_ticks: Vec<(String, f64)> = if panel_index + 1 == modes.len() {
            days.iter()
                .filter_map(|day| {
                    x.position(day)
                        .map(|px| (format_day_key(day, &config.day_format), px))
                })
                .collect()
        } else {
            Vec::new()
        };
        draw_category_axis_bottom(
            &mut builder,
            style,
            &day_ticks,
            bottom,
            (layout.plot_left(), layout.plot_right()),
        );
        draw_title(
            &mut builder,
            style,
            mode_label.clone(),
            layout.plot_left() + 4.0,
            top + 12.0,
            TextHAlign::Left,
        );

        for series_key in &series {
            let mut points: Vec<(f64, f64, &BandSample)> = samples
                .iter()
                .filter(|sample| sample.series == *series_key)
                .filter_map(|sample| {
                    x.position(&sample.day)
                        .map(|px| (px, y.map(sample.value), *sample))
                })
                .collect();
            if points.is_empty() {
                continue;
            }
            points.sort_by_key(|&(px, _, _)| OrderedFloat(px));
            let color = colors
                .get(series_key)
                .copied()
                .unwrap_or_else(|| Color::rgb(0.0, 0.0, 0.0));
            let series_label = ctx.label(series_key);

            let coords: Vec<(f64, f64)> = points.iter().map(|&(px, py, _)| (px, py)).collect();
            let path = PathPrimitive::stroked(
                PathPrimitive::polyline(&coords),
                color,
                config.stroke_width,
            );
            let length = path.length();
            let line_key = format!("{mode}:{series_key}");
            let path_id = builder.add(
                NodeDraft::new(SceneLayer::Marks, Shape::Path(path))
                    .with_role(NodeRole::mark_in_group(line_key.clone(), *series_key))
                    .with_transition(Transition::new(
                        TransitionKind::StrokeReveal { length },
                        config.duration_ms,
                    )),
            );
            instance.bind(
                path_id,
                MarkBinding::new(
                    line_key.clone(),
                    TooltipContent::Static(tooltip_html(&series_label, &[mode_label.clone()])),
                )
                .in_group(*series_key)
                .with_legend_key(*series_key)
                .with_hover(HoverEffect::with_stroke(config.hover_stroke_width)),
            );

            for &(px, py, sample) in &points {
                let key = format!("{line_key}:{}", sample.day);
                let body = ctx.text(
                    "charts.multiBand.tooltip",
                    "{{day}}: {{value}}",
                    json!({
                        "mode": mode_label,
                        "day": format_day_key(&sample.day, &config.day_format),
                        "value": ctx.value(finite_or_zero(sample.value)),
                    }),
                );
                let circle = CirclePrimitive::new(px, py, config.point_radius, Paint::Solid(color))
                    .with_stroke(1.0, Color::rgb(1.0, 1.0, 1.0));
                let id = builder.add(
                    NodeDraft::new(SceneLayer::Marks, Shape::Circle(circle))
                        .with_role(NodeRole::mark_in_group(key.clone(), *series_key))
                        .with_transition(
                            Transition::new(TransitionKind::FadeIn, config.duration_ms / 3)
                                .with_delay(config.duration_ms),
                        ),
                );
                instance.bind(
                    id,
                    MarkBinding::new(
                        key,
                        TooltipContent::Static(tooltip_html(
                            &series_label,
                            &[mode_label.clone(), body],
                        )),
                    )
                    .in_group(*series_key)
                    .with_legend_key(*series_key)
                    .with_hover(HoverEffect {
                        opacity: 1.0,
                        stroke_width: Some(2.0),
                        raise: true,
                    }),
                );
            }
        }
    }

    let legend_items: Vec<LegendItem> = colors
        .iter()
        .map(|(key, color)| LegendItem {
            key: (*key).to_owned(),
            label: ctx.label(key),
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
        panels = modes.len(),
        series = series.len(),
        nodes = committed,
        "multi-band chart rendered"
    );
    Some(ChartHandle::new(instance))
}
