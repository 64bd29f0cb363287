use cairo::{Context, Format, ImageSurface, LinearGradient};
use pango::FontDescription;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, Paint, PathCommand, PathPrimitive, RectPrimitive, RenderFrame, Renderer, Shape,
    TextHAlign,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub circles_drawn: usize,
    pub paths_drawn: usize,
    pub texts_drawn: usize,
}

/// Offscreen Cairo + Pango rasterizer used by PNG export.
///
/// The surface is `pixel_ratio` times the logical frame size; drawing happens
/// in logical units under a uniform scale.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    pixel_ratio: f64,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> ChartResult<Self> {
        if width == 0 || height == 0 {
            return Err(ChartError::InvalidViewport { width, height });
        }
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "pixel ratio must be finite and > 0".to_owned(),
            ));
        }

        let device_width = (f64::from(width) * pixel_ratio).ceil() as i32;
        let device_height = (f64::from(height) * pixel_ratio).ceil() as i32;
        let surface = ImageSurface::create(Format::ARgb32, device_width, device_height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            pixel_ratio,
            clear_color: Color::rgb(1.0, 1.0, 1.0),
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Encodes the current surface as PNG.
    pub fn to_png_bytes(&self) -> ChartResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.surface
            .write_to_png(&mut bytes)
            .map_err(|err| ChartError::Export(format!("failed to encode png: {err}")))?;
        Ok(bytes)
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        context.scale(self.pixel_ratio, self.pixel_ratio);
        apply_color(context, self.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        for node in &frame.nodes {
            context
                .save()
                .map_err(|err| map_backend_error("failed to save context", err))?;
            let stroke_override = node.style.stroke_width;
            match &node.shape {
                Shape::Line(line) => {
                    apply_color(context, fade(line.color, node.style.opacity));
                    context.set_line_width(stroke_override.unwrap_or(line.stroke_width));
                    context.move_to(line.x1, line.y1);
                    context.line_to(line.x2, line.y2);
                    context
                        .stroke()
                        .map_err(|err| map_backend_error("failed to stroke line", err))?;
                    stats.lines_drawn += 1;
                }
                Shape::Rect(rect) => {
                    append_rect_path(context, rect);
                    apply_paint(context, &rect.fill, node.style.opacity, rect.y, rect.height)?;
                    let border = stroke_override.unwrap_or(rect.border_width);
                    fill_and_stroke(context, border, rect.border_color, node.style.opacity)?;
                    stats.rects_drawn += 1;
                }
                Shape::Circle(circle) => {
                    context.new_sub_path();
                    context.arc(circle.cx, circle.cy, circle.radius, 0.0, 2.0 * PI);
                    apply_paint(
                        context,
                        &circle.fill,
                        node.style.opacity,
                        circle.cy - circle.radius,
                        circle.radius * 2.0,
                    )?;
                    let stroke = stroke_override.unwrap_or(circle.stroke_width);
                    fill_and_stroke(context, stroke, circle.stroke_color, node.style.opacity)?;
                    stats.circles_drawn += 1;
                }
                Shape::Path(path) => {
                    draw_path(context, path, node.style.opacity, stroke_override)?;
                    stats.paths_drawn += 1;
                }
                Shape::Text(text) => {
                    let layout = pangocairo::functions::create_layout(context);
                    let weight = if text.bold { "Semi-Bold " } else { "" };
                    let font = format!("Sans {weight}{}", text.font_size_px);
                    let font_description = FontDescription::from_string(&font);
                    layout.set_font_description(Some(&font_description));
                    layout.set_text(&text.text);

                    let (text_width, _) = layout.pixel_size();
                    let baseline = f64::from(layout.baseline()) / f64::from(pango::SCALE);
                    let x = match text.h_align {
                        TextHAlign::Left => text.x,
                        TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
                        TextHAlign::Right => text.x - f64::from(text_width),
                    };

                    apply_color(context, fade(text.color, node.style.opacity));
                    context.move_to(x, text.y - baseline);
                    pangocairo::functions::show_layout(context, &layout);
                    stats.texts_drawn += 1;
                }
            }
            context
                .restore()
                .map_err(|err| map_backend_error("failed to restore context", err))?;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

fn fade(color: Color, opacity: f64) -> Color {
    color.with_alpha(color.alpha * opacity)
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn apply_paint(
    context: &Context,
    paint: &Paint,
    opacity: f64,
    top: f64,
    height: f64,
) -> ChartResult<()> {
    match paint {
        Paint::Solid(color) => apply_color(context, fade(*color, opacity)),
        Paint::VerticalGradient {
            top: top_color,
            bottom: bottom_color,
            ..
        } => {
            let gradient = LinearGradient::new(0.0, top, 0.0, top + height.max(1.0));
            let top_color = fade(*top_color, opacity);
            let bottom_color = fade(*bottom_color, opacity);
            gradient.add_color_stop_rgba(
                0.0,
                top_color.red,
                top_color.green,
                top_color.blue,
                top_color.alpha,
            );
            gradient.add_color_stop_rgba(
                1.0,
                bottom_color.red,
                bottom_color.green,
                bottom_color.blue,
                bottom_color.alpha,
            );
            context
                .set_source(&gradient)
                .map_err(|err| map_backend_error("failed to set gradient source", err))?;
        }
    }
    Ok(())
}

fn fill_and_stroke(
    context: &Context,
    stroke_width: f64,
    stroke_color: Color,
    opacity: f64,
) -> ChartResult<()> {
    if stroke_width > 0.0 {
        context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill shape", err))?;
        apply_color(context, fade(stroke_color, opacity));
        context.set_line_width(stroke_width);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke shape border", err))
    } else {
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill shape", err))
    }
}

fn draw_path(
    context: &Context,
    path: &PathPrimitive,
    opacity: f64,
    stroke_override: Option<f64>,
) -> ChartResult<()> {
    context.new_path();
    let mut top = f64::INFINITY;
    let mut bottom = f64::NEG_INFINITY;
    for command in &path.commands {
        match *command {
            PathCommand::MoveTo(x, y) => {
                context.move_to(x, y);
                top = top.min(y);
                bottom = bottom.max(y);
            }
            PathCommand::LineTo(x, y) => {
                context.line_to(x, y);
                top = top.min(y);
                bottom = bottom.max(y);
            }
            PathCommand::Arc {
                cx,
                cy,
                radius,
                start_angle,
                end_angle,
            } => {
                if end_angle >= start_angle {
                    context.arc(cx, cy, radius, start_angle, end_angle);
                } else {
                    context.arc_negative(cx, cy, radius, start_angle, end_angle);
                }
                top = top.min(cy - radius);
                bottom = bottom.max(cy + radius);
            }
            PathCommand::Close => context.close_path(),
        }
    }

    if let Some(fill) = &path.fill {
        apply_paint(context, fill, opacity, top, bottom - top)?;
        if path.stroke.is_some() {
            context
                .fill_preserve()
                .map_err(|err| map_backend_error("failed to fill path", err))?;
        } else {
            context
                .fill()
                .map_err(|err| map_backend_error("failed to fill path", err))?;
        }
    }
    if let Some(stroke) = path.stroke {
        apply_color(context, fade(stroke, opacity));
        context.set_line_width(stroke_override.unwrap_or(path.stroke_width));
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke path", err))?;
    }
    Ok(())
}

fn append_rect_path(context: &Context, rect: &RectPrimitive) {
    if rect.corner_radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let radius = rect
        .corner_radius
        .min(rect.width * 0.5)
        .min(rect.height * 0.5);
    let left = rect.x;
    let top = rect.y;
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;

    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Export(format!("{prefix}: {err}"))
}
