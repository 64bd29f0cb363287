pub mod band_scale;
pub mod radial;
pub mod scale;
pub mod ticks;
pub mod types;

pub use band_scale::{BandScale, DEFAULT_BAND_PADDING, PointScale, nearest_position_index};
pub use radial::{
    RADIAL_DOMAIN_MAX, RadialScale, axis_angle, nearest_axis_by_angle, polar_to_cartesian,
};
pub use scale::{DEFAULT_HEADROOM, LinearScale, SqrtScale};
pub use ticks::{
    AXIS_MAX_TICKS, AXIS_MIN_TICKS, AXIS_VALUE_TARGET_SPACING_PX, TickValues,
    axis_tick_target_count, nice, ticks,
};
pub use types::{ChartLayout, Margins, Viewport, finite_or_zero};
