use crate::core::{
    AXIS_MAX_TICKS, AXIS_MIN_TICKS, AXIS_VALUE_TARGET_SPACING_PX, LinearScale,
    axis_tick_target_count,
};
use crate::render::{
    LinePrimitive, NodeDraft, NodeId, NodeRole, SceneBuilder, SceneLayer, Shape, TextHAlign,
    TextPrimitive,
};

use super::context::RenderContext;
use super::style::ChartStyle;

const TICK_LABEL_GAP_PX: f64 = 8.0;

/// Tick count for an axis spanning `span_px` pixels.
#[must_use]
pub(crate) fn tick_count_for_span(span_px: f64) -> usize {
    axis_tick_target_count(
        span_px.abs(),
        AXIS_VALUE_TARGET_SPACING_PX,
        AXIS_MIN_TICKS,
        AXIS_MAX_TICKS,
    )
}

fn text(
    builder: &mut SceneBuilder,
    layer: SceneLayer,
    primitive: TextPrimitive,
    out: &mut Vec<NodeId>,
) {
    let draft = NodeDraft::new(layer, Shape::Text(primitive)).with_role(NodeRole::Label);
    out.extend(builder.add_text(draft));
}

fn line(
    builder: &mut SceneBuilder,
    layer: SceneLayer,
    primitive: LinePrimitive,
    out: &mut Vec<NodeId>,
) {
    out.push(builder.add_shape(layer, Shape::Line(primitive)));
}

/// Vertical value axis at `axis_x` with horizontal grid lines to `grid_end_x`.
///
/// Returns every node drawn so incremental updates can replace the axis.
pub(crate) fn draw_value_axis_left(
    builder: &mut SceneBuilder,
    ctx: &RenderContext<'_>,
    style: &ChartStyle,
    scale: LinearScale,
    axis_x: f64,
    grid_end_x: f64,
) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let (bottom, top) = scale.range();
    for tick in scale.ticks(tick_count_for_span(bottom - top)) {
        let y = scale.map(tick);
        line(
            builder,
            SceneLayer::Grid,
            LinePrimitive::new(
                axis_x,
                y,
                grid_end_x,
                y,
                style.grid_line_width,
                style.grid_line_color,
            ),
            &mut nodes,
        );
        text(
            builder,
            SceneLayer::Axis,
            TextPrimitive::new(
                ctx.value(tick),
                axis_x - TICK_LABEL_GAP_PX,
                y + style.tick_font_size_px * 0.35,
                style.tick_font_size_px,
                style.axis_label_color,
                TextHAlign::Right,
            ),
            &mut nodes,
        );
    }
    line(
        builder,
        SceneLayer::Axis,
        LinePrimitive::new(
            axis_x,
            top,
            axis_x,
            bottom,
            style.axis_line_width,
            style.axis_line_color,
        ),
        &mut nodes,
    );
    nodes
}

/// Horizontal value axis along `axis_y` with vertical grid lines up to `grid_top_y`.
pub(crate) fn draw_value_axis_bottom(
    builder: &mut SceneBuilder,
    ctx: &RenderContext<'_>,
    style: &ChartStyle,
    scale: LinearScale,
    axis_y: f64,
    grid_top_y: f64,
) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let (left, right) = scale.range();
    for tick in scale.ticks(tick_count_for_span(right - left)) {
        let x = scale.map(tick);
        line(
            builder,
            SceneLayer::Grid,
            LinePrimitive::new(
                x,
                grid_top_y,
                x,
                axis_y,
                style.grid_line_width,
                style.grid_line_color,
            ),
            &mut nodes,
        );
        text(
            builder,
            SceneLayer::Axis,
            TextPrimitive::new(
                ctx.value(tick),
                x,
                axis_y + TICK_LABEL_GAP_PX + style.tick_font_size_px,
                style.tick_font_size_px,
                style.axis_label_color,
                TextHAlign::Center,
            ),
            &mut nodes,
        );
    }
    line(
        builder,
        SceneLayer::Axis,
        LinePrimitive::new(
            left,
            axis_y,
            right,
            axis_y,
            style.axis_line_width,
            style.axis_line_color,
        ),
        &mut nodes,
    );
    nodes
}

/// Category labels centered under each `(label, x)` plus a baseline rule.
pub(crate) fn draw_category_axis_bottom(
    builder: &mut SceneBuilder,
    style: &ChartStyle,
    categories: &[(String, f64)],
    axis_y: f64,
    span: (f64, f64),
) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    line(
        builder,
        SceneLayer::Axis,
        LinePrimitive::new(
            span.0,
            axis_y,
            span.1,
            axis_y,
            style.axis_line_width,
            style.axis_line_color,
        ),
        &mut nodes,
    );
    for (label, x) in categories {
        text(
            builder,
            SceneLayer::Axis,
            TextPrimitive::new(
                label.clone(),
                *x,
                axis_y + TICK_LABEL_GAP_PX + style.label_font_size_px,
                style.label_font_size_px,
                style.axis_label_color,
                TextHAlign::Center,
            ),
            &mut nodes,
        );
    }
    nodes
}

/// Category labels right-aligned left of `axis_x`, one per `(label, y)`.
pub(crate) fn draw_category_axis_left(
    builder: &mut SceneBuilder,
    style: &ChartStyle,
    categories: &[(String, f64)],
    axis_x: f64,
) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    for (label, y) in categories {
        text(
            builder,
            SceneLayer::Axis,
            TextPrimitive::new(
                label.clone(),
                axis_x - TICK_LABEL_GAP_PX,
                y + style.label_font_size_px * 0.35,
                style.label_font_size_px,
                style.axis_label_color,
                TextHAlign::Right,
            ),
            &mut nodes,
        );
    }
    nodes
}

/// Bold title text, used for panel and axis captions.
pub(crate) fn draw_title(
    builder: &mut SceneBuilder,
    style: &ChartStyle,
    title: String,
    x: f64,
    y: f64,
    h_align: TextHAlign,
) -> Option<NodeId> {
    let mut nodes = Vec::with_capacity(1);
    text(
        builder,
        SceneLayer::Labels,
        TextPrimitive::new(title, x, y, style.title_font_size_px, style.title_color, h_align)
            .bold(),
        &mut nodes,
    );
    nodes.pop()
}
