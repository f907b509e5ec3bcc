//! Fan profile curves and their chart.

mod chart;
mod curve;

pub use chart::{ProfileChart, DEFAULT_HEIGHT, DEFAULT_WIDTH, PLOT_COLOR};
pub use curve::{can_add_step, step_bounds, ProfileCurve, ProfileLimits, SpeedStep, StepBounds};
