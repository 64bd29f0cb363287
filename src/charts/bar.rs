use std::cmp::Reverse;

use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::core::{
    BandScale, ChartLayout, DEFAULT_BAND_PADDING, DEFAULT_HEADROOM, LinearScale, finite_or_zero,
};
use crate::palette::Palette;
use crate::render::{
    LinePrimitive, NodeDraft, NodeId, NodeRole, OwnerId, Paint, RectPrimitive, SceneBuilder,
    SceneLayer, Shape, TextHAlign, TextPrimitive, Transition, TransitionKind,
};

use super::axis::draw_value_axis_left;
use super::context::RenderContext;
use super::handle::{ChartHandle, ChartInstance, ChartKind, MarkBinding, TooltipContent};
use super::join::DataJoin;
use super::style::{ChartStyle, tooltip_html};
use super::{begin_render, log_empty};

pub const BAR_DURATION_MS: u32 = 800;
pub const BAR_STAGGER_MS: u32 = 60;
const VALUE_LABEL_GAP_PX: f64 = 6.0;
const CATEGORY_LABEL_GAP_PX: f64 = 18.0;

/// One category and its value, e.g. a city and its shop count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarDatum {
    pub key: String,
    pub value: f64,
}

impl BarDatum {
    #[must_use]
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChartConfig {
    pub layout: ChartLayout,
    pub headroom: f64,
    pub band_padding: f64,
    /// Orders bars by descending value; ties keep input order.
    pub sort_descending: bool,
    pub duration_ms: u32,
    pub stagger_ms: u32,
    pub corner_radius: f64,
    pub show_value_labels: bool,
    pub palette: Palette,
    pub style: ChartStyle,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::default(),
            headroom: DEFAULT_HEADROOM,
            band_padding: DEFAULT_BAND_PADDING,
            sort_descending: false,
            duration_ms: BAR_DURATION_MS,
            stagger_ms: BAR_STAGGER_MS,
            corner_radius: 4.0,
            show_value_labels: true,
            palette: Palette::cities(),
            style: ChartStyle::default(),
        }
    }
}

/// Final pixel geometry of one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub key: String,
    pub value: f64,
    /// Position in the input, used for palette fallback.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BarGeometry {
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width * 0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub x: BandScale,
    pub y: LinearScale,
    pub bars: Vec<BarGeometry>,
}

/// Computes scales and bar rectangles from the current data.
///
/// Non-finite and negative values are drawn as zero-height bars.
#[must_use]
pub fn layout_bars(data: &[BarDatum], config: &BarChartConfig) -> BarLayout {
    let layout = config.layout;
    let mut items: Vec<(usize, &BarDatum, f64)> = data
        .iter()
        .enumerate()
        .map(|(index, datum)| (index, datum, finite_or_zero(datum.value).max(0.0)))
        .collect();
    if config.sort_descending {
        items.sort_by_key(|&(_, _, value)| Reverse(OrderedFloat(value)));
    }

    let x = BandScale::new(
        items.iter().map(|(_, datum, _)| datum.key.as_str()),
        (layout.plot_left(), layout.plot_right()),
        config.band_padding,
    );
    let y = LinearScale::from_values_with_headroom(
        items.iter().map(|&(_, _, value)| value),
        config.headroom,
        (layout.plot_bottom(), layout.plot_top()),
    );

    let bars = items
        .iter()
        .map(|&(index, datum, value)| {
            let top = y.map(value);
            BarGeometry {
                key: datum.key.clone(),
                value,
                index,
                x: x.position(&datum.key).unwrap_or(layout.plot_left()),
                y: top,
                width: x.bandwidth(),
                height: (layout.plot_bottom() - top).max(0.0),
            }
        })
        .collect();

    BarLayout { x, y, bars }
}

/// Nodes drawn for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BarNodes {
    pub bar: NodeId,
    pub value_label: Option<NodeId>,
    pub category_label: Option<NodeId>,
}

impl BarNodes {
    pub(crate) fn ids(self) -> impl Iterator<Item = NodeId> {
        [Some(self.bar), self.value_label, self.category_label]
            .into_iter()
            .flatten()
    }
}

/// Scene bookkeeping kept by charts that update bars in place.
#[derive(Debug, Default)]
pub(crate) struct BarScene {
    pub join: DataJoin<BarNodes>,
    /// Bars whose key repeats an earlier one; redrawn on every update.
    pub unkeyed: Vec<BarNodes>,
    pub axis_nodes: Vec<NodeId>,
    pub next_slot: usize,
}

pub(crate) fn bar_tooltip(ctx: &RenderContext<'_>, key: &str, value: f64) -> TooltipContent {
    let label = ctx.label(key);
    let body = ctx.text(
        "charts.bar.tooltip",
        "Value: {{value}}",
        json!({ "label": label, "value": ctx.value(value) }),
    );
    TooltipContent::Static(tooltip_html(&label, &[body]))
}

pub(crate) fn bar_shape(
    owner: OwnerId,
    slot: usize,
    bar: &BarGeometry,
    total: usize,
    config: &BarChartConfig,
) -> Shape {
    let stops = config.palette.resolve_gradient(&bar.key, bar.index, total);
    let fill = Paint::VerticalGradient {
        id: format!("bar-fill-{}-{slot}", owner.0),
        top: stops.top,
        bottom: stops.bottom,
    };
    let radius = config.corner_radius.min(bar.width * 0.5).max(0.0);
    Shape::Rect(
        RectPrimitive::new(bar.x, bar.y, bar.width, bar.height, fill).with_corner_radius(radius),
    )
}

pub(crate) fn value_label_shape(
    ctx: &RenderContext<'_>,
    bar: &BarGeometry,
    style: &ChartStyle,
) -> Shape {
    Shape::Text(TextPrimitive::new(
        ctx.value(bar.value),
        bar.center_x(),
        bar.y - VALUE_LABEL_GAP_PX,
        style.label_font_size_px,
        style.value_label_color,
        TextHAlign::Center,
    ))
}

pub(crate) fn category_label_shape(
    ctx: &RenderContext<'_>,
    bar: &BarGeometry,
    layout: ChartLayout,
    style: &ChartStyle,
) -> Shape {
    let label = ctx.label(&bar.key);
    let text = if label.is_empty() { bar.key.clone() } else { label };
    Shape::Text(TextPrimitive::new(
        text,
        bar.center_x(),
        layout.plot_bottom() + CATEGORY_LABEL_GAP_PX,
        style.label_font_size_px,
        style.axis_label_color,
        TextHAlign::Center,
    ))
}

/// Value axis plus the baseline rule.
pub(crate) fn draw_bar_axes(
    builder: &mut SceneBuilder,
    ctx: &RenderContext<'_>,
    config: &BarChartConfig,
    geometry: &BarLayout,
) -> Vec<NodeId> {
    let layout = config.layout;
    let style = &config.style;
    let mut nodes = draw_value_axis_left(
        builder,
        ctx,
        style,
        geometry.y,
        layout.plot_left(),
        layout.plot_right(),
    );
    nodes.push(builder.add_shape(
        SceneLayer::Axis,
        Shape::Line(LinePrimitive::new(
            layout.plot_left(),
            layout.plot_bottom(),
            layout.plot_right(),
            layout.plot_bottom(),
            style.axis_line_width,
            style.axis_line_color,
        )),
    ));
    nodes
}

/// Adds the bar, its labels and returns them with the bar's hover binding.
#[allow(clippy::too_many_arguments)]
pub(crate) fn add_bar(
    builder: &mut SceneBuilder,
    ctx: &RenderContext<'_>,
    config: &BarChartConfig,
    bar: &BarGeometry,
    total: usize,
    slot: usize,
    entrance: Transition,
) -> (BarNodes, MarkBinding) {
    let layout = config.layout;
    let label_delay = entrance.total_ms();
    let bar_id = builder.add(
        NodeDraft::new(SceneLayer::Marks, bar_shape(builder.owner(), slot, bar, total, config))
            .with_role(NodeRole::mark(bar.key.clone()))
            .with_transition(entrance),
    );
    let value_label = if config.show_value_labels {
        builder.add_text(
            NodeDraft::new(SceneLayer::Labels, value_label_shape(ctx, bar, &config.style))
                .with_role(NodeRole::Label)
                .with_transition(
                    Transition::new(TransitionKind::FadeIn, config.duration_ms / 2)
                        .with_delay(label_delay),
                ),
        )
    } else {
        None
    };
    let category_label = builder.add_text(
        NodeDraft::new(SceneLayer::Labels, category_label_shape(ctx, bar, layout, &config.style))
            .with_role(NodeRole::Label),
    );
    let nodes = BarNodes {
        bar: bar_id,
        value_label,
        category_label,
    };
    (nodes, MarkBinding::new(bar.key.clone(), bar_tooltip(ctx, &bar.key, bar.value)))
}

pub(crate) fn render_bar_scene(
    ctx: &RenderContext<'_>,
    data: &[BarDatum],
    config: &BarChartConfig,
    kind: ChartKind,
) -> Option<(ChartHandle, BarScene)> {
    if data.is_empty() {
        log_empty(kind);
        return None;
    }
    if data.iter().any(|datum| !datum.value.is_finite()) {
        warn!(chart = ?kind, "non-finite bar values coerced to zero");
    }
    let (owner, layout) = begin_render(ctx, kind, config.layout)?;
    let config = &BarChartConfig {
        layout,
        ..config.clone()
    };

    let geometry = layout_bars(data, config);
    let mut builder = SceneBuilder::new(ctx.container, owner);
    let mut instance = ChartInstance::new(kind, owner, ctx.container, ctx.tooltip, ctx.export);
    let mut scene = BarScene {
        axis_nodes: draw_bar_axes(&mut builder, ctx, config, &geometry),
        ..BarScene::default()
    };

    let mut seen = IndexSet::new();
    for (slot, bar) in geometry.bars.iter().enumerate() {
        let entrance = Transition::new(
            TransitionKind::GrowFromBaseline {
                baseline_y: layout.plot_bottom(),
            },
            config.duration_ms,
        )
        .with_delay(config.stagger_ms.saturating_mul(slot as u32));
        let (nodes, binding) = add_bar(&mut builder, ctx, config, bar, data.len(), slot, entrance);
        instance.bind(nodes.bar, binding);
        if seen.insert(bar.key.as_str()) {
            scene.join.insert(bar.key.clone(), nodes);
        } else {
            scene.unkeyed.push(nodes);
        }
    }
    scene.next_slot = geometry.bars.len();

    let committed = builder.commit();
    debug!(
        chart = ?kind,
        owner = owner.0,
        bars = geometry.bars.len(),
        nodes = committed,
        y_max = geometry.y.domain().1,
        "bar chart rendered"
    );
    Some((ChartHandle::new(instance), scene))
}

/// Renders one gradient bar per datum with value labels and a value axis.
pub fn render_bar_chart(
    ctx: &RenderContext<'_>,
    data: &[BarDatum],
    config: &BarChartConfig,
) -> Option<ChartHandle> {
    render_bar_scene(ctx, data, config, ChartKind::Bar).map(|(handle, _)| handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_layout_is_stable_for_ties() {
        let config = BarChartConfig {
            sort_descending: true,
            ..BarChartConfig::default()
        };
        let data = vec![
            BarDatum::new("a", 1.0),
            BarDatum::new("b", 3.0),
            BarDatum::new("c", 1.0),
        ];
        let keys: Vec<_> = layout_bars(&data, &config)
            .bars
            .into_iter()
            .map(|bar| bar.key)
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn negative_and_nan_values_become_flat_bars() {
        let data = vec![BarDatum::new("a", -4.0), BarDatum::new("b", f64::NAN)];
        let layout = layout_bars(&data, &BarChartConfig::default());
        assert!(layout.bars.iter().all(|bar| bar.height == 0.0));
        assert_eq!(layout.y.domain(), (0.0, 1.0));
    }
}
