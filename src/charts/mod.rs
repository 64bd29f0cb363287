//! Render pipelines, one per chart type.
//!
//! Every pipeline follows the same contract: empty input returns `None`
//! without touching the container; otherwise the container is cleared, the
//! scene is rebuilt in layer order and a [`ChartHandle`] is returned.

mod axis;
mod bar;
mod bubble;
mod context;
mod deferred;
mod donut;
mod dumbbell;
mod handle;
mod join;
mod legend;
mod line;
mod live_bar;
mod multi_band;
mod parallel;
mod radial;
mod style;

use tracing::{debug, warn};

use crate::core::ChartLayout;
use crate::render::OwnerId;

pub use bar::{BarChartConfig, BarDatum, BarGeometry, BarLayout, layout_bars, render_bar_chart};
pub use bubble::{
    BubbleChartConfig, BubbleGeometry, LabelOffsets, bubble_geometry, pill_width,
    render_bubble_chart,
};
pub use context::{
    DefaultTranslator, GroupedNumbers, LabelFormatter, RawLabels, RenderContext, SharedContext,
    Translate, ValueFormatter, format_day_key, interpolate,
};
pub use deferred::{DEFAULT_MOUNT_DELAY_MS, DeferredMount, mount_deferred};
pub use donut::{
    DonutChartConfig, DonutDatum, DonutLayout, DonutRing, DonutSlice, donut_layout,
    render_donut_chart,
};
pub use dumbbell::{DumbbellChartConfig, render_dumbbell_chart};
pub use handle::{ChartHandle, ChartKind, MarkInfo};
pub use join::{DataJoin, JoinPlan};
pub use legend::LegendPlacement;
pub use line::{LineChartConfig, LinePoint, LineSeries, render_line_chart};
pub use live_bar::{
    LIVE_UPDATE_DURATION_MS, LiveBarChart, LiveBarConfig, LivePhase, MagnitudeControl,
    render_live_bar_chart,
};
pub use multi_band::{BandSample, MultiBandChartConfig, render_multi_band_chart};
pub use parallel::{ParallelChartConfig, StationRecord, metric_keys, render_parallel_chart};
pub use radial::{RadialChartConfig, render_radial_chart};
pub use style::{ChartStyle, estimate_label_text_width_px};

/// Shop metrics shared by the dumbbell and bubble charts.
pub use dumbbell::ShopMetrics;

/// Shared prologue once input is known to be non-empty.
///
/// Validates the layout, clears the container and allocates the owner id of
/// the new pass. `None` means the render must be skipped.
pub(crate) fn begin_render(
    ctx: &RenderContext<'_>,
    kind: ChartKind,
    layout: ChartLayout,
) -> Option<(OwnerId, ChartLayout)> {
    if !ctx.container.is_attached() {
        warn!(chart = ?kind, "container detached; render skipped");
        return None;
    }
    let layout = match layout.validate() {
        Ok(layout) => layout,
        Err(err) => {
            warn!(chart = ?kind, %err, "invalid layout; render skipped");
            return None;
        }
    };
    ctx.container.clear();
    ctx.container.set_viewport(layout.viewport());
    let owner = ctx.container.allocate_owner();
    debug!(
        chart = ?kind,
        owner = owner.0,
        width = layout.width,
        height = layout.height,
        "render pass started"
    );
    Some((owner, layout))
}

pub(crate) fn log_empty(kind: ChartKind) {
    debug!(chart = ?kind, "empty input; render skipped");
}
