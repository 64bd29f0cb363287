use serde::{Deserialize, Serialize};

use crate::render::Color;

/// Colors and sizes shared by every chart's axes, labels and legend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub grid_line_color: Color,
    pub axis_line_color: Color,
    pub axis_label_color: Color,
    /// Value labels drawn on or next to marks.
    pub value_label_color: Color,
    pub title_color: Color,
    pub grid_line_width: f64,
    pub axis_line_width: f64,
    pub tick_font_size_px: f64,
    pub label_font_size_px: f64,
    pub title_font_size_px: f64,
    pub legend_swatch_px: f64,
    pub legend_gap_px: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            grid_line_color: Color::rgb(0.89, 0.92, 0.95),
            axis_line_color: Color::rgb(0.82, 0.84, 0.88),
            axis_label_color: Color::rgb(0.10, 0.12, 0.16),
            value_label_color: Color::rgb(0.20, 0.23, 0.28),
            title_color: Color::rgb(0.10, 0.12, 0.16),
            grid_line_width: 1.0,
            axis_line_width: 1.0,
            tick_font_size_px: 11.0,
            label_font_size_px: 12.0,
            title_font_size_px: 13.0,
            legend_swatch_px: 12.0,
            legend_gap_px: 16.0,
        }
    }
}

/// Backend-independent text width estimate, used for pills and legend spacing.
#[must_use]
pub fn estimate_label_text_width_px(text: &str, font_size_px: f64) -> f64 {
    let units = text.chars().fold(0.0, |acc, ch| {
        acc + match ch {
            '0'..='9' => 0.62,
            '.' | ',' => 0.34,
            '-' | '+' | '%' => 0.42,
            ' ' => 0.33,
            _ => 0.58,
        }
    });
    (units * font_size_px).max(font_size_px)
}

/// `<strong>title</strong><br/>body` tooltip markup with the title escaped.
#[must_use]
pub(crate) fn tooltip_html(title: &str, lines: &[String]) -> String {
    let mut html = format!("<strong>{}</strong>", escape_html(title));
    for line in lines {
        html.push_str("<br/>");
        html.push_str(&escape_html(line));
    }
    html
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
