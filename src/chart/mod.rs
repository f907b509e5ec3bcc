//! Scrolling strip charts.
//!
//! [`Renderer`]s paint one series of a table; a [`ChartSurface`] owns the
//! cached image they paint into and animates it between samples.

mod renderer;
mod surface;

pub use renderer::{LineRenderer, RenderWindow, Renderer, StackedRenderer};
pub use surface::{ChartSurface, Tick, MAX_MISSED_FRAMES};
