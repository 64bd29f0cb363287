mod highlight;
mod random;
mod scheduler;
mod tooltip;

use serde::{Deserialize, Serialize};

pub use highlight::{DIM_OPACITY, HighlightController, HighlightState};
pub use random::{RandomSource, SeededRandom};
pub use scheduler::{Scheduler, TimerId};
pub use tooltip::{TOOLTIP_FADE_MS, TOOLTIP_OFFSET_PX, Tooltip, TooltipFade, TooltipState};

/// Pointer position in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
