use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::core::{BandScale, ChartLayout, DEFAULT_HEADROOM, LinearScale, Margins, finite_or_zero};
use crate::render::{
    CirclePrimitive, Color, LinePrimitive, NodeDraft, NodeRole, Paint, SceneBuilder, SceneLayer,
    Shape, Transition, TransitionKind,
};

use super::axis::{draw_category_axis_left, draw_value_axis_bottom};
use super::context::RenderContext;
use super::handle::{
    ChartHandle, ChartInstance, ChartKind, HoverEffect, MarkBinding, TooltipContent,
};
use super::legend::{LegendItem, LegendPlacement, draw_legend};
use super::style::{ChartStyle, tooltip_html};
use super::{begin_render, log_empty};

pub const DUMBBELL_DURATION_MS: u32 = 700;
const CUSTOMERS: &str = "customers";
const REVENUE: &str = "revenue";

/// Per-city shop aggregate shared by the dumbbell and bubble charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopMetrics {
    pub city: String,
    pub customers_per_day: f64,
    pub revenue_per_day: f64,
    pub shops: f64,
    pub menu_type: String,
}

impl ShopMetrics {
    #[must_use]
    pub fn new(
        city: impl Into<String>,
        customers_per_day: f64,
        revenue_per_day: f64,
        shops: f64,
        menu_type: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            customers_per_day,
            revenue_per_day,
            shops,
            menu_type: menu_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumbbellChartConfig {
    pub layout: ChartLayout,
    pub headroom: f64,
    pub band_padding: f64,
    /// Connector stroke range in pixels, mapped linearly from the shop count.
    pub connector_width_range: (f64, f64),
    pub connector_color: Color,
    pub dot_radius: f64,
    pub customers_color: Color,
    pub revenue_color: Color,
    pub duration_ms: u32,
    pub legend: LegendPlacement,
    pub style: ChartStyle,
}

impl Default for DumbbellChartConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::new(720.0, 420.0)
                .with_margins(Margins::new(40.0, 24.0, 40.0, 96.0)),
            headroom: DEFAULT_HEADROOM,
            band_padding: 0.4,
            connector_width_range: (2.0, 10.0),
            connector_color: Color::rgb(0.75, 0.77, 0.8),
            dot_radius: 7.0,
            customers_color: Color::rgb(0.16, 0.5, 0.73),
            revenue_color: Color::rgb(0.9, 0.49, 0.13),
            duration_ms: DUMBBELL_DURATION_MS,
            legend: LegendPlacement::TopRight,
            style: ChartStyle::default(),
        }
    }
}

/// Linear shop-count to stroke-width mapping; a flat dataset gets the mid width.
fn connector_width(data: &[ShopMetrics], range: (f64, f64)) -> impl Fn(f64) -> f64 {
    let (min, max) = data
        .iter()
        .map(|row| finite_or_zero(row.shops))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let scale = LinearScale::new((min, max), range).ok();
    let fallback = (range.0 + range.1) * 0.5;
    move |shops| scale.map_or(fallback, |scale| scale.map(finite_or_zero(shops)))
}

/// Customers and revenue per city joined by a connector whose width encodes the shop count.
pub fn render_dumbbell_chart(
    ctx: &RenderContext<'_>,
    data: &[ShopMetrics],
    config: &DumbbellChartConfig,
) -> Option<ChartHandle> {
    let kind = ChartKind::Dumbbell;
    if data.is_empty() {
        log_empty(kind);
        return None;
    }
    let (owner, layout) = begin_render(ctx, kind, config.layout)?;
    let style = &config.style;

    let y = BandScale::new(
        data.iter().map(|row| row.city.as_str()),
        (layout.plot_top(), layout.plot_bottom()),
        config.band_padding,
    );
    let x = LinearScale::from_values_with_headroom(
        data.iter().flat_map(|row| [row.customers_per_day, row.revenue_per_day]),
        config.headroom,
        (layout.plot_left(), layout.plot_right()),
    );
    let width_for = connector_width(data, config.connector_width_range);

    let mut builder = SceneBuilder::new(ctx.container, owner);
    let mut instance = ChartInstance::new(kind, owner, ctx.container, ctx.tooltip, ctx.export);

    draw_value_axis_bottom(&mut builder, ctx, style, x, layout.plot_bottom(), layout.plot_top());
    let cities: Vec<(String, f64)> = data
        .iter()
        .filter_map(|row| y.center(&row.city).map(|cy| (ctx.label(&row.city), cy)))
        .collect();
    draw_category_axis_left(&mut builder, style, &cities, layout.plot_left());

    let customers_label = ctx.text("charts.dumbbell.customers", "Customers per day", json!({}));
    let revenue_label = ctx.text("charts.dumbbell.revenue", "Revenue per day", json!({}));
    let metrics = [
        (CUSTOMERS, config.customers_color, customers_label.as_str()),
        (REVENUE, config.revenue_color, revenue_label.as_str()),
    ];

    for (index, row) in data.iter().enumerate() {
        let Some(cy) = y.center(&row.city) else {
            warn!(chart = ?kind, city = %row.city, "city missing from band scale");
            continue;
        };
        let customers_x = x.map(row.customers_per_day);
        let revenue_x = x.map(row.revenue_per_day);
        let delay = 40u32.saturating_mul(index as u32);
        let city_label = ctx.label(&row.city);

        let connector = LinePrimitive::new(
            customers_x,
            cy,
            revenue_x,
            cy,
            width_for(row.shops),
            config.connector_color,
        );
        builder.add(
            NodeDraft::new(SceneLayer::Marks, Shape::Line(connector))
                .with_role(NodeRole::Decoration)
                .with_transition(
                    Transition::new(TransitionKind::FadeIn, config.duration_ms).with_delay(delay),
                ),
        );

        for (metric, color, metric_label) in metrics {
            let (px, value) = if metric == CUSTOMERS {
                (customers_x, row.customers_per_day)
            } else {
                (revenue_x, row.revenue_per_day)
            };
            let key = format!("{}:{metric}", row.city);
            let body = ctx.text(
                &format!("charts.dumbbell.tooltip.{metric}"),
                "{{metric}}: {{value}}",
                json!({
                    "metric": metric_label,
                    "value": ctx.value(finite_or_zero(value)),
                    "shops": ctx.value(finite_or_zero(row.shops)),
                }),
            );
            let shops = ctx.text(
                "charts.dumbbell.shops",
                "Shops: {{shops}}",
                json!({ "shops": ctx.value(finite_or_zero(row.shops)) }),
            );
            let circle = CirclePrimitive::new(px, cy, config.dot_radius, Paint::Solid(color))
                .with_stroke(1.5, Color::rgb(1.0, 1.0, 1.0));
            let id = builder.add(
                NodeDraft::new(SceneLayer::Marks, Shape::Circle(circle))
                    .with_role(NodeRole::mark_in_group(key.clone(), metric))
                    .with_transition(
                        Transition::new(TransitionKind::ScaleIn, config.duration_ms)
                            .with_delay(delay),
                    ),
            );
            instance.bind(
                id,
                MarkBinding::new(
                    key,
                    TooltipContent::Static(tooltip_html(&city_label, &[body, shops])),
                )
                .in_group(metric)
                .with_legend_key(metric)
                .with_hover(HoverEffect {
                    opacity: 1.0,
                    stroke_width: Some(3.0),
                    raise: true,
                }),
            );
        }
    }

    let legend_items: Vec<LegendItem> = metrics
        .iter()
        .map(|(metric, color, label)| LegendItem {
            key: (*metric).to_owned(),
            label: (*label).to_owned(),
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
        cities = data.len(),
        nodes = committed,
        "dumbbell chart rendered"
    );
    Some(ChartHandle::new(instance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_width_spans_configured_range() {
        let data = vec![
            ShopMetrics::new("Berlin", 120.0, 900.0, 4.0, "vegan"),
            ShopMetrics::new("Köln", 80.0, 600.0, 12.0, "mixed"),
        ];
        let width = connector_width(&data, (2.0, 10.0));
        assert!((width(4.0) - 2.0).abs() < 1e-9);
        assert!((width(12.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn equal_shop_counts_use_mid_width() {
        let data = vec![ShopMetrics::new("Berlin", 1.0, 2.0, 5.0, "vegan")];
        let width = connector_width(&data, (2.0, 10.0));
        assert_eq!(width(5.0), 6.0);
    }
}
