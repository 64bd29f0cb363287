use std::cmp::Reverse;

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::core::{ChartLayout, DEFAULT_HEADROOM, LinearScale, Margins, SqrtScale, finite_or_zero};
use crate::palette::Palette;
use crate::render::{
    CirclePrimitive, Color, NodeDraft, NodeRole, Paint, RectPrimitive, SceneBuilder, SceneLayer,
    Shape, TextHAlign, TextPrimitive, Transition, TransitionKind,
};

use super::axis::{draw_title, draw_value_axis_bottom, draw_value_axis_left};
use super::context::RenderContext;
use super::dumbbell::ShopMetrics;
use super::handle::{
    ChartHandle, ChartInstance, ChartKind, HoverEffect, MarkBinding, TooltipContent,
};
use super::legend::{LegendItem, LegendPlacement, draw_legend};
use super::style::{ChartStyle, tooltip_html};
use super::{begin_render, log_empty};

pub const BUBBLE_DURATION_MS: u32 = 700;
const PILL_PADDING_PX: f64 = 6.0;
const PILL_CHAR_WIDTH_PX: f64 = 7.0;
const PILL_HEIGHT_PX: f64 = 18.0;
const PILL_FONT_SIZE_PX: f64 = 11.0;

/// Width of the label pill: fixed padding plus an average width per character.
#[must_use]
pub fn pill_width(text: &str) -> f64 {
    2.0 * PILL_PADDING_PX + text.chars().count() as f64 * PILL_CHAR_WIDTH_PX
}

/// Per-city nudges for pill labels that would otherwise collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelOffsets(pub IndexMap<String, (f64, f64)>);

impl LabelOffsets {
    #[must_use]
    pub fn none() -> Self {
        Self(IndexMap::new())
    }

    /// Offset for `city`; unknown cities stay centered.
    #[must_use]
    pub fn offset(&self, city: &str) -> (f64, f64) {
        self.0.get(city).copied().unwrap_or((0.0, 0.0))
    }
}

impl Default for LabelOffsets {
    fn default() -> Self {
        Self(
            [
                ("Berlin", (0.0, -22.0)),
                ("Hamburg", (18.0, 14.0)),
                ("München", (-18.0, 14.0)),
                ("Köln", (20.0, -10.0)),
            ]
            .into_iter()
            .map(|(city, offset)| (city.to_owned(), offset))
            .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleChartConfig {
    pub layout: ChartLayout,
    pub headroom: f64,
    pub radius_range: (f64, f64),
    pub palette: Palette,
    pub duration_ms: u32,
    pub label_offsets: LabelOffsets,
    pub legend: LegendPlacement,
    pub style: ChartStyle,
}

impl Default for BubbleChartConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::new(720.0, 480.0)
                .with_margins(Margins::new(48.0, 32.0, 56.0, 72.0)),
            headroom: DEFAULT_HEADROOM,
            radius_range: (12.0, 36.0),
            palette: Palette::menu_types(),
            duration_ms: BUBBLE_DURATION_MS,
            label_offsets: LabelOffsets::default(),
            legend: LegendPlacement::TopRight,
            style: ChartStyle::default(),
        }
    }
}

/// Placement of one bubble and its pill label.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleGeometry {
    pub city: String,
    pub menu_type: String,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub color: Color,
    /// Pill center after applying the label offset.
    pub label_x: f64,
    pub label_y: f64,
    pub label: String,
    pub pill_width: f64,
}

/// Customers on x, revenue on y, both from zero with headroom.
fn position_scales(data: &[ShopMetrics], config: &BubbleChartConfig) -> (LinearScale, LinearScale) {
    let layout = config.layout;
    let x = LinearScale::from_values_with_headroom(
        data.iter().map(|row| row.customers_per_day),
        config.headroom,
        (layout.plot_left(), layout.plot_right()),
    );
    let y = LinearScale::from_values_with_headroom(
        data.iter().map(|row| row.revenue_per_day),
        config.headroom,
        (layout.plot_bottom(), layout.plot_top()),
    );
    (x, y)
}

/// Bubble positions in paint order: larger bubbles first so small ones stay reachable.
#[must_use]
pub fn bubble_geometry(data: &[ShopMetrics], config: &BubbleChartConfig) -> Vec<BubbleGeometry> {
    let (x, y) = position_scales(data, config);
    let radius = SqrtScale::from_values(data.iter().map(|row| row.shops), config.radius_range);
    let menu_types: IndexSet<&str> = data.iter().map(|row| row.menu_type.as_str()).collect();

    let mut bubbles: Vec<BubbleGeometry> = data
        .iter()
        .map(|row| {
            let cx = x.map(row.customers_per_day);
            let cy = y.map(row.revenue_per_day);
            let (dx, dy) = config.label_offsets.offset(&row.city);
            let label = format!("{:.0}", finite_or_zero(row.shops));
            let index = menu_types.get_index_of(row.menu_type.as_str()).unwrap_or(0);
            BubbleGeometry {
                city: row.city.clone(),
                menu_type: row.menu_type.clone(),
                cx,
                cy,
                radius: radius.map(row.shops),
                color: config.palette.resolve(&row.menu_type, index, menu_types.len()),
                label_x: cx + dx,
                label_y: cy + dy,
                pill_width: pill_width(&label),
                label,
            }
        })
        .collect();
    bubbles.sort_by_key(|bubble| Reverse(OrderedFloat(bubble.radius)));
    bubbles
}

/// Scatter of customers against revenue with shop count as bubble area.
pub fn render_bubble_chart(
    ctx: &RenderContext<'_>,
    data: &[ShopMetrics],
    config: &BubbleChartConfig,
) -> Option<ChartHandle> {
    let kind = ChartKind::Bubble;
    if data.is_empty() {
        log_empty(kind);
        return None;
    }
    let (owner, layout) = begin_render(ctx, kind, config.layout)?;
    let config = &BubbleChartConfig {
        layout,
        ..config.clone()
    };
    let style = &config.style;
    let bubbles = bubble_geometry(data, config);

    let mut builder = SceneBuilder::new(ctx.container, owner);
    let mut instance = ChartInstance::new(kind, owner, ctx.container, ctx.tooltip, ctx.export)
        .with_mark_dimming();

    let (x, y) = position_scales(data, config);
    draw_value_axis_bottom(&mut builder, ctx, style, x, layout.plot_bottom(), layout.plot_top());
    draw_value_axis_left(&mut builder, ctx, style, y, layout.plot_left(), layout.plot_right());
    draw_title(
        &mut builder,
        style,
        ctx.text("charts.bubble.xAxis", "Customers per day", json!({})),
        (layout.plot_left() + layout.plot_right()) * 0.5,
        layout.height - 8.0,
        TextHAlign::Center,
    );
    draw_title(
        &mut builder,
        style,
        ctx.text("charts.bubble.yAxis", "Revenue per day", json!({})),
        layout.plot_left(),
        layout.plot_top() - 12.0,
        TextHAlign::Left,
    );

    let rows: IndexMap<&str, &ShopMetrics> =
        data.iter().map(|row| (row.city.as_str(), row)).collect();
    for bubble in &bubbles {
        let transition = Transition::new(TransitionKind::ScaleIn, config.duration_ms);
        let fill = Paint::Solid(bubble.color.with_alpha(0.85));
        let circle = CirclePrimitive::new(bubble.cx, bubble.cy, bubble.radius, fill)
            .with_stroke(1.5, Color::rgb(1.0, 1.0, 1.0));
        let id = builder.add(
            NodeDraft::new(SceneLayer::Marks, Shape::Circle(circle))
                .with_role(NodeRole::mark_in_group(bubble.city.clone(), bubble.menu_type.clone()))
                .with_transition(transition),
        );

        let city_label = ctx.label(&bubble.city);
        let lines = rows.get(bubble.city.as_str()).map_or_else(Vec::new, |row| {
            vec![
                ctx.text(
                    "charts.bubble.customers",
                    "Customers per day: {{value}}",
                    json!({ "value": ctx.value(finite_or_zero(row.customers_per_day)) }),
                ),
                ctx.text(
                    "charts.bubble.revenue",
                    "Revenue per day: {{value}}",
                    json!({ "value": ctx.value(finite_or_zero(row.revenue_per_day)) }),
                ),
                ctx.text(
                    "charts.bubble.shops",
                    "Shops: {{value}}",
                    json!({ "value": bubble.label }),
                ),
                ctx.text(
                    &format!("charts.bubble.menuTypes.{}", row.menu_type),
                    &ctx.label(&row.menu_type),
                    json!({}),
                ),
            ]
        });
        instance.bind(
            id,
            MarkBinding::new(
                bubble.city.clone(),
                TooltipContent::Static(tooltip_html(&city_label, &lines)),
            )
            .with_legend_key(bubble.menu_type.clone())
            .with_hover(HoverEffect {
                opacity: 1.0,
                stroke_width: Some(3.0),
                raise: true,
            }),
        );

        if bubble.label.is_empty() {
            continue;
        }
        let label_fade = Transition::new(TransitionKind::FadeIn, config.duration_ms / 2)
            .with_delay(config.duration_ms);
        let pill = RectPrimitive::new(
            bubble.label_x - bubble.pill_width * 0.5,
            bubble.label_y - PILL_HEIGHT_PX * 0.5,
            bubble.pill_width,
            PILL_HEIGHT_PX,
            Paint::Solid(Color::rgb(1.0, 1.0, 1.0).with_alpha(0.9)),
        )
        .with_corner_radius(PILL_HEIGHT_PX * 0.5)
        .with_border(1.0, bubble.color);
        builder.add(
            NodeDraft::new(SceneLayer::Labels, Shape::Rect(pill))
                .with_role(NodeRole::Label)
                .with_transition(label_fade.clone()),
        );
        let text = TextPrimitive::new(
            bubble.label.clone(),
            bubble.label_x,
            bubble.label_y + PILL_FONT_SIZE_PX * 0.35,
            PILL_FONT_SIZE_PX,
            style.value_label_color,
            TextHAlign::Center,
        )
        .bold();
        builder.add_text(
            NodeDraft::new(SceneLayer::Labels, Shape::Text(text))
                .with_role(NodeRole::Label)
                .with_transition(label_fade),
        );
    }

    let menu_types: IndexSet<&str> = data.iter().map(|row| row.menu_type.as_str()).collect();
    let legend_items: Vec<LegendItem> = menu_types
        .iter()
        .enumerate()
        .map(|(index, menu_type)| LegendItem {
            key: (*menu_type).to_owned(),
            label: ctx.text(
                &format!("charts.bubble.menuTypes.{menu_type}"),
                &ctx.label(menu_type),
                json!({}),
            ),
            color: config.palette.resolve(menu_type, index, menu_types.len()),
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
        bubbles = bubbles.len(),
        nodes = committed,
        "bubble chart rendered"
    );
    Some(ChartHandle::new(instance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pill_width_grows_per_character() {
        assert_eq!(pill_width(""), 12.0);
        assert_eq!(pill_width("12"), 26.0);
        assert_eq!(pill_width("Köln"), 40.0);
    }

    #[test]
    fn unknown_city_has_no_offset() {
        assert_eq!(LabelOffsets::default().offset("Leipzig"), (0.0, 0.0));
        assert_ne!(LabelOffsets::default().offset("Berlin"), (0.0, 0.0));
    }
}
