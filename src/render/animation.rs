use serde::{Deserialize, Serialize};

use super::{PathCommand, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

/// How a node moves from its entrance (or previous) state to its target shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Rect grows upward from `baseline_y` to its final height.
    GrowFromBaseline { baseline_y: f64 },
    /// Stroke drawn in by animating the dash offset from `length` to zero.
    StrokeReveal { length: f64 },
    FadeIn,
    /// Circle radius and opacity grow from zero.
    ScaleIn,
    /// Every arc opens out from `origin_angle`, so ring slices unfold together.
    Sweep { origin_angle: f64 },
    /// Update from the geometry a node had in the previous pass.
    Tween { from: Box<Shape> },
}

/// Declarative animation attached to a scene node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub easing: Easing,
}

/// Node state sampled at one instant of a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionFrame {
    pub shape: Shape,
    pub opacity: f64,
    /// Remaining hidden stroke length, for stroke reveals.
    pub dash_offset: Option<f64>,
}

impl Transition {
    #[must_use]
    pub fn new(kind: TransitionKind, duration_ms: u32) -> Self {
        Self {
            kind,
            duration_ms,
            delay_ms: 0,
            easing: Easing::default(),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn total_ms(&self) -> u32 {
        self.delay_ms.saturating_add(self.duration_ms)
    }

    /// Eased progress in `[0, 1]` after `elapsed_ms`.
    #[must_use]
    pub fn progress(&self, elapsed_ms: u32) -> f64 {
        if elapsed_ms <= self.delay_ms {
            return if self.duration_ms == 0 && elapsed_ms == self.delay_ms {
                1.0
            } else {
                0.0
            };
        }
        if self.duration_ms == 0 {
            return 1.0;
        }
        let raw = f64::from(elapsed_ms - self.delay_ms) / f64::from(self.duration_ms);
        self.easing.apply(raw)
    }

    /// Samples `target` at `elapsed_ms` into the transition.
    #[must_use]
    pub fn frame(&self, target: &Shape, target_opacity: f64, elapsed_ms: u32) -> TransitionFrame {
        let t = self.progress(elapsed_ms);
        match &self.kind {
            TransitionKind::GrowFromBaseline { baseline_y } => {
                let shape = match target {
                    Shape::Rect(rect) => {
                        let mut rect = rect.clone();
                        let height = rect.height * t;
                        rect.y = baseline_y - (baseline_y - rect.y) * t;
                        rect.height = height;
                        Shape::Rect(rect)
                    }
                    other => other.clone(),
                };
                TransitionFrame {
                    shape,
                    opacity: target_opacity,
                    dash_offset: None,
                }
            }
            TransitionKind::StrokeReveal { length } => TransitionFrame {
                shape: target.clone(),
                opacity: target_opacity,
                dash_offset: Some(length * (1.0 - t)),
            },
            TransitionKind::FadeIn => TransitionFrame {
                shape: target.clone(),
                opacity: target_opacity * t,
                dash_offset: None,
            },
            TransitionKind::ScaleIn => {
                let shape = match target {
                    Shape::Circle(circle) => {
                        let mut circle = circle.clone();
                        circle.radius *= t;
                        Shape::Circle(circle)
                    }
                    other => other.clone(),
                };
                TransitionFrame {
                    shape,
                    opacity: target_opacity * t,
                    dash_offset: None,
                }
            }
            TransitionKind::Sweep { origin_angle } => {
                let shape = match target {
                    Shape::Path(path) => {
                        let mut path = path.clone();
                        for command in &mut path.commands {
                            if let PathCommand::Arc {
                                start_angle,
                                end_angle,
                                ..
                            } = command
                            {
                                *start_angle = lerp(*origin_angle, *start_angle, t);
                                *end_angle = lerp(*origin_angle, *end_angle, t);
                            }
                        }
                        Shape::Path(path)
                    }
                    other => other.clone(),
                };
                TransitionFrame {
                    shape,
                    opacity: target_opacity,
                    dash_offset: None,
                }
            }
            TransitionKind::Tween { from } => TransitionFrame {
                shape: tween_shape(from, target, t),
                opacity: target_opacity,
                dash_offset: None,
            },
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn tween_shape(from: &Shape, to: &Shape, t: f64) -> Shape {
    match (from, to) {
        (Shape::Rect(a), Shape::Rect(b)) => {
            let mut rect = b.clone();
            rect.x = lerp(a.x, b.x, t);
            rect.y = lerp(a.y, b.y, t);
            rect.width = lerp(a.width, b.width, t);
            rect.height = lerp(a.height, b.height, t);
            Shape::Rect(rect)
        }
        (Shape::Circle(a), Shape::Circle(b)) => {
            let mut circle = b.clone();
            circle.cx = lerp(a.cx, b.cx, t);
            circle.cy = lerp(a.cy, b.cy, t);
            circle.radius = lerp(a.radius, b.radius, t);
            Shape::Circle(circle)
        }
        (Shape::Text(a), Shape::Text(b)) => {
            let mut text = b.clone();
            text.x = lerp(a.x, b.x, t);
            text.y = lerp(a.y, b.y, t);
            Shape::Text(text)
        }
        (Shape::Line(a), Shape::Line(b)) => {
            let mut line = *b;
            line.x1 = lerp(a.x1, b.x1, t);
            line.y1 = lerp(a.y1, b.y1, t);
            line.x2 = lerp(a.x2, b.x2, t);
            line.y2 = lerp(a.y2, b.y2, t);
            Shape::Line(line)
        }
        _ if t >= 1.0 => to.clone(),
        _ => from.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, Paint, RectPrimitive};

    #[test]
    fn cubic_easing_hits_endpoints_and_midpoint() {
        let easing = Easing::CubicInOut;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(1.0), 1.0);
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn grow_starts_flat_on_baseline() {
        let rect = RectPrimitive::new(
            10.0,
            100.0,
            20.0,
            200.0,
            Paint::Solid(Color::rgb(0.0, 0.0, 0.0)),
        );
        let transition = Transition::new(
            TransitionKind::GrowFromBaseline { baseline_y: 300.0 },
            800,
        );
        let Shape::Rect(start) = transition.frame(&Shape::Rect(rect.clone()), 1.0, 0).shape else {
            panic!("rect expected");
        };
        assert_eq!(start.height, 0.0);
        assert_eq!(start.y, 300.0);
        let Shape::Rect(end) = transition.frame(&Shape::Rect(rect.clone()), 1.0, 800).shape else {
            panic!("rect expected");
        };
        assert_eq!(end, rect);
    }
}
