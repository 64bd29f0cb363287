use std::f64::consts::TAU;
use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::error::ChartResult;

use super::{Color, Paint, PathCommand, RenderFrame, Renderer, SceneNode, Shape, TextHAlign};

const GLOW_FILTER_ID: &str = "mark-glow";
const FONT_FAMILY: &str = "Inter, Segoe UI, sans-serif";

/// Renderer that serializes frames to SVG 1.1 markup.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    background: Option<Color>,
    last_output: String,
}

impl SvgRenderer {
    #[must_use]
    pub fn new(background: Option<Color>) -> Self {
        Self {
            background,
            last_output: String::new(),
        }
    }

    #[must_use]
    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.last_output
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.last_output = frame_to_svg(frame, self.background);
        Ok(())
    }
}

/// Serializes final (post-transition) geometry of `frame`.
#[must_use]
pub fn frame_to_svg(frame: &RenderFrame, background: Option<Color>) -> String {
    let width = frame.viewport.width;
    let height = frame.viewport.height;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );

    write_defs(&mut svg, frame);

    if let Some(color) = background {
        let _ = writeln!(
            svg,
            "  <rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"{}\"{}/>",
            color.to_hex(),
            alpha_attr("fill-opacity", color.alpha)
        );
    }

    for node in &frame.nodes {
        write_node(&mut svg, node);
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_defs(svg: &mut String, frame: &RenderFrame) {
    let mut gradients: IndexMap<&str, (Color, Color)> = IndexMap::new();
    let mut needs_glow = false;
    for node in &frame.nodes {
        needs_glow |= node.style.glow;
        let paint = match &node.shape {
            Shape::Rect(rect) => Some(&rect.fill),
            Shape::Circle(circle) => Some(&circle.fill),
            Shape::Path(path) => path.fill.as_ref(),
            Shape::Line(_) | Shape::Text(_) => None,
        };
        if let Some(Paint::VerticalGradient { id, top, bottom }) = paint {
            gradients.entry(id.as_str()).or_insert((*top, *bottom));
        }
    }
    if gradients.is_empty() && !needs_glow {
        return;
    }

    svg.push_str("  <defs>\n");
    for (id, (top, bottom)) in gradients {
        let _ = writeln!(
            svg,
            "    <linearGradient id=\"{}\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\">",
            escape_xml(id)
        );
        let _ = writeln!(
            svg,
            "      <stop offset=\"0%\" stop-color=\"{}\"{}/>",
            top.to_hex(),
            alpha_attr("stop-opacity", top.alpha)
        );
        let _ = writeln!(
            svg,
            "      <stop offset=\"100%\" stop-color=\"{}\"{}/>",
            bottom.to_hex(),
            alpha_attr("stop-opacity", bottom.alpha)
        );
        svg.push_str("    </linearGradient>\n");
    }
    if needs_glow {
        let _ = writeln!(
            svg,
            "    <filter id=\"{GLOW_FILTER_ID}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feGaussianBlur stdDeviation=\"4\" result=\"blur\"/><feMerge><feMergeNode in=\"blur\"/><feMergeNode in=\"SourceGraphic\"/></feMerge></filter>"
        );
    }
    svg.push_str("  </defs>\n");
}

fn write_node(svg: &mut String, node: &SceneNode) {
    let mut common = String::new();
    if node.style.opacity < 1.0 {
        let _ = write!(common, " opacity=\"{:.3}\"", node.style.opacity);
    }
    if node.style.glow {
        let _ = write!(common, " filter=\"url(#{GLOW_FILTER_ID})\"");
    }
    let stroke_override = node.style.stroke_width;

    match &node.shape {
        Shape::Line(line) => {
            let _ = writeln!(
                svg,
                "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\"{} stroke-width=\"{:.2}\"{common}/>",
                line.x1,
                line.y1,
                line.x2,
                line.y2,
                line.color.to_hex(),
                alpha_attr("stroke-opacity", line.color.alpha),
                stroke_override.unwrap_or(line.stroke_width)
            );
        }
        Shape::Rect(rect) => {
            let mut attrs = paint_attrs(&rect.fill, "fill");
            let border = stroke_override.unwrap_or(rect.border_width);
            if border > 0.0 {
                let _ = write!(
                    attrs,
                    " stroke=\"{}\"{} stroke-width=\"{border:.2}\"",
                    rect.border_color.to_hex(),
                    alpha_attr("stroke-opacity", rect.border_color.alpha)
                );
            }
            if rect.corner_radius > 0.0 {
                let _ = write!(attrs, " rx=\"{:.2}\"", rect.corner_radius);
            }
            let _ = writeln!(
                svg,
                "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"{attrs}{common}/>",
                rect.x, rect.y, rect.width, rect.height
            );
        }
        Shape::Circle(circle) => {
            let mut attrs = paint_attrs(&circle.fill, "fill");
            let stroke = stroke_override.unwrap_or(circle.stroke_width);
            if stroke > 0.0 {
                let _ = write!(
                    attrs,
                    " stroke=\"{}\"{} stroke-width=\"{stroke:.2}\"",
                    circle.stroke_color.to_hex(),
                    alpha_attr("stroke-opacity", circle.stroke_color.alpha)
                );
            }
            let _ = writeln!(
                svg,
                "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\"{attrs}{common}/>",
                circle.cx, circle.cy, circle.radius
            );
        }
        Shape::Path(path) => {
            let mut attrs = match &path.fill {
                Some(fill) => paint_attrs(fill, "fill"),
                None => " fill=\"none\"".to_owned(),
            };
            if let Some(stroke) = path.stroke {
                let _ = write!(
                    attrs,
                    " stroke=\"{}\"{} stroke-width=\"{:.2}\" stroke-linejoin=\"round\" stroke-linecap=\"round\"",
                    stroke.to_hex(),
                    alpha_attr("stroke-opacity", stroke.alpha),
                    stroke_override.unwrap_or(path.stroke_width)
                );
            }
            let _ = writeln!(
                svg,
                "  <path d=\"{}\"{attrs}{common}/>",
                path_data(&path.commands)
            );
        }
        Shape::Text(text) => {
            let anchor = match text.h_align {
                TextHAlign::Left => "start",
                TextHAlign::Center => "middle",
                TextHAlign::Right => "end",
            };
            let weight = if text.bold { " font-weight=\"600\"" } else { "" };
            let _ = writeln!(
                svg,
                "  <text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{FONT_FAMILY}\" font-size=\"{:.1}\" text-anchor=\"{anchor}\" fill=\"{}\"{}{weight}{common}>{}</text>",
                text.x,
                text.y,
                text.font_size_px,
                text.color.to_hex(),
                alpha_attr("fill-opacity", text.color.alpha),
                escape_xml(&text.text)
            );
        }
    }
}

fn paint_attrs(paint: &Paint, attribute: &str) -> String {
    match paint {
        Paint::Solid(color) => format!(
            " {attribute}=\"{}\"{}",
            color.to_hex(),
            alpha_attr(&format!("{attribute}-opacity"), color.alpha)
        ),
        Paint::VerticalGradient { id, .. } => format!(" {attribute}=\"url(#{})\"", escape_xml(id)),
    }
}

fn alpha_attr(name: &str, alpha: f64) -> String {
    if alpha < 1.0 {
        format!(" {name}=\"{alpha:.3}\"")
    } else {
        String::new()
    }
}

/// SVG path data for `commands`.
#[must_use]
pub fn path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    let mut has_point = false;
    for command in commands {
        match *command {
            PathCommand::MoveTo(x, y) => {
                let _ = write!(d, "M{x:.2},{y:.2}");
                has_point = true;
            }
            PathCommand::LineTo(x, y) => {
                let verb = if has_point { 'L' } else { 'M' };
                let _ = write!(d, "{verb}{x:.2},{y:.2}");
                has_point = true;
            }
            PathCommand::Arc {
                cx,
                cy,
                radius,
                start_angle,
                end_angle,
            } => {
                let (sx, sy) = (cx + radius * start_angle.cos(), cy + radius * start_angle.sin());
                let verb = if has_point { 'L' } else { 'M' };
                let _ = write!(d, "{verb}{sx:.2},{sy:.2}");
                has_point = true;

                let sweep = u8::from(end_angle >= start_angle);
                let span = (end_angle - start_angle).abs();
                if span >= TAU - 1e-9 {
                    // A single SVG arc cannot close on its own start point.
                    let mid = start_angle + (end_angle - start_angle) * 0.5;
                    let (mx, my) = (cx + radius * mid.cos(), cy + radius * mid.sin());
                    let _ = write!(d, "A{radius:.2},{radius:.2} 0 0 {sweep} {mx:.2},{my:.2}");
                }
                let (ex, ey) = (cx + radius * end_angle.cos(), cy + radius * end_angle.sin());
                let large = u8::from(span > std::f64::consts::PI && span < TAU - 1e-9);
                let _ = write!(d, "A{radius:.2},{radius:.2} 0 {large} {sweep} {ex:.2},{ey:.2}");
            }
            PathCommand::Close => d.push('Z'),
        }
    }
    d
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_circle_arc_uses_small_arc_flag() {
        let d = path_data(&[PathCommand::Arc {
            cx: 0.0,
            cy: 0.0,
            radius: 10.0,
            start_angle: 0.0,
            end_angle: std::f64::consts::FRAC_PI_2,
        }]);
        assert_eq!(d, "M10.00,0.00A10.00,10.00 0 0 1 0.00,10.00");
    }

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_xml("Köln & <Bonn>"), "Köln &amp; &lt;Bonn&gt;");
    }
}
