//! chart-gallery: chart rendering and interaction engine.
//!
//! Charts draw into a retained vector scene owned by a [`render::Container`].
//! Every `render_*` function clears its container, draws grid, axes, marks,
//! labels and legend in that order, and returns a [`charts::ChartHandle`]
//! that routes pointer events, drives hover highlighting through the shared
//! [`interaction::Tooltip`] and removes everything on cleanup.

pub mod charts;
pub mod config;
pub mod core;
pub mod error;
pub mod interaction;
pub mod palette;
pub mod render;
pub mod telemetry;

pub use charts::{ChartHandle, ChartKind, RenderContext, SharedContext};
pub use config::GalleryConfig;
pub use error::{ChartError, ChartResult};
