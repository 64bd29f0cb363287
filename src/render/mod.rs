mod animation;
mod builder;
mod export;
mod frame;
mod null_renderer;
mod primitives;
mod scene;
pub mod svg;

pub use animation::{Easing, Transition, TransitionFrame, TransitionKind};
pub use builder::{NodeDraft, SceneBuilder};
pub use export::{
    ExportHandle, ExportSettings, ExportSink, ExportedFile, MemorySink, PNG_MIME, SVG_MIME,
};
pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, Paint, PathCommand, PathPrimitive, RectPrimitive, Shape,
    TextHAlign, TextPrimitive,
};
pub use scene::{Container, NodeId, NodeRole, NodeStyle, OwnerId, SceneLayer, SceneNode};
pub use svg::SvgRenderer;

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a materialized `RenderFrame` so drawing code stays
/// isolated from chart semantics and interaction state.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoRenderStats, CairoRenderer};
