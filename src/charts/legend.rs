use serde::{Deserialize, Serialize};

use crate::render::{
    Color, NodeDraft, NodeId, NodeRole, Paint, RectPrimitive, SceneBuilder, SceneLayer, Shape,
    TextHAlign, TextPrimitive,
};

use super::style::{ChartStyle, estimate_label_text_width_px};

/// Where the legend row is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LegendPlacement {
    #[default]
    TopRight,
    TopLeft,
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LegendItem {
    pub key: String,
    pub label: String,
    pub color: Color,
}

/// Width of one swatch-plus-label entry.
fn entry_width(style: &ChartStyle, label: &str) -> f64 {
    style.legend_swatch_px + 6.0 + estimate_label_text_width_px(label, style.label_font_size_px)
}

/// Draws a single legend row; both swatch and label answer to the entry key.
///
/// `y` is the row's vertical center. Returns `(node, key)` pairs for binding.
pub(crate) fn draw_legend(
    builder: &mut SceneBuilder,
    style: &ChartStyle,
    items: &[LegendItem],
    placement: LegendPlacement,
    span: (f64, f64),
    y: f64,
) -> Vec<(NodeId, String)> {
    if items.is_empty() || placement == LegendPlacement::Hidden {
        return Vec::new();
    }
    let total: f64 = items
        .iter()
        .map(|item| entry_width(style, &item.label))
        .sum::<f64>()
        + style.legend_gap_px * (items.len() - 1) as f64;
    let mut x = match placement {
        LegendPlacement::TopRight => (span.1 - total).max(span.0),
        _ => span.0,
    };

    let swatch = style.legend_swatch_px;
    let mut nodes = Vec::with_capacity(items.len() * 2);
    for item in items {
        let role = NodeRole::LegendEntry {
            key: item.key.clone(),
        };
        let rect = RectPrimitive::new(x, y - swatch * 0.5, swatch, swatch, Paint::Solid(item.color))
            .with_corner_radius(2.0);
        let swatch_id = builder
            .add(NodeDraft::new(SceneLayer::Legend, Shape::Rect(rect)).with_role(role.clone()));
        nodes.push((swatch_id, item.key.clone()));

        let label = TextPrimitive::new(
            item.label.clone(),
            x + swatch + 6.0,
            y + style.label_font_size_px * 0.35,
            style.label_font_size_px,
            style.axis_label_color,
            TextHAlign::Left,
        );
        let label = NodeDraft::new(SceneLayer::Legend, Shape::Text(label)).with_role(role);
        if let Some(label_id) = builder.add_text(label) {
            nodes.push((label_id, item.key.clone()));
        }
        x += entry_width(style, &item.label) + style.legend_gap_px;
    }
    nodes
}
