//! # Trueno-Strip
//!
//! Scrolling strip-chart time-series model and renderers for hardware
//! monitoring widgets.
//!
//! A [`TimeSeriesTable`](model::TimeSeriesTable) keeps a bounded history of
//! timestamped samples in ring columns and notifies observers when rows or
//! bounds change. A [`ChartSurface`](chart::ChartSurface) paints the table
//! with pluggable [`Renderer`](chart::Renderer)s into a cached framebuffer and
//! scrolls it smoothly between samples. A static
//! [`ProfileChart`](profile::ProfileChart) draws fan-duty curves with a
//! hysteresis overlay.
//!
//! ## Features
//!
//! - **Pure Rust**: software rasterizer with anti-aliased strokes, no system
//!   graphics stack
//! - **Bounded memory**: fixed-capacity ring columns evict the oldest sample
//! - **Multiple Outputs**: PNG and SVG through the same [`Canvas`](render::Canvas)
//!   drawing API
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use trueno_strip::prelude::*;
//!
//! let table = TimeSeriesTable::new(&["gpu_temp"], 60)?
//!     .with_timespan(60 * USEC_PER_SEC)?
//!     .into_shared();
//! let clock = Rc::new(ManualClock::new(0));
//!
//! let mut chart = ChartSurface::new(Rc::clone(&table), clock);
//! chart.add_renderer(StackedRenderer::new(0));
//! chart.allocate(200, 80);
//!
//! table.borrow_mut().append(0, &[42.0])?;
//! table.borrow_mut().append(USEC_PER_SEC, &[57.0])?;
//!
//! let frame = chart.snapshot()?;
//! assert_eq!((frame.width(), frame.height()), (200, 80));
//! # Ok::<(), trueno_strip::Error>(())
//! ```
//!
//! ## Academic References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types.
pub mod color;

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Geometric primitives (points, rectangles, transforms).
pub mod geometry;

/// Scale functions for data-to-visual mappings.
pub mod scale;

/// Monotonic clock capability.
pub mod clock;

// ============================================================================
// Data Model
// ============================================================================

/// Ring columns, time-series tables and cursors.
pub mod model;

// ============================================================================
// Chart Modules
// ============================================================================

/// Strip-chart renderers and the cached scrolling surface.
pub mod chart;

/// Fan profile curves and chart.
pub mod profile;

/// Historical-data panel built from strip charts.
pub mod history;

/// Panel configuration.
pub mod config;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Drawing API and rasterization.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-strip operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use trueno_strip::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chart::{
        ChartSurface, LineRenderer, RenderWindow, Renderer, StackedRenderer, Tick, MAX_MISSED_FRAMES,
    };
    pub use crate::clock::{Clock, ManualClock, MonotonicClock, USEC_PER_SEC};
    pub use crate::color::Rgba;
    pub use crate::error::{Error, Result};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::geometry::{Point, Rect};
    pub use crate::model::{RingColumn, SharedTable, TableCursor, TableEvent, TimeSeriesTable};
    pub use crate::profile::{ProfileChart, ProfileCurve, ProfileLimits, SpeedStep};
    pub use crate::render::Canvas;
    pub use crate::scale::{LinearScale, Scale};
    pub use batuta_common::display::WithDimensions;
}
