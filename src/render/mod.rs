//! Rendering backends and rasterization.
//!
//! Everything that paints goes through the [`Canvas`] capability: renderers
//! build paths in user space and stroke or fill them, and the backend decides
//! what that means.
//!
//! # Backends
//!
//! - [`RasterCanvas`]: anti-aliased rasterization into a [`Framebuffer`](crate::framebuffer::Framebuffer)
//! - [`SvgCanvas`](crate::output::SvgCanvas): vector output
//! - [`RecordingCanvas`]: records calls for assertions in tests
//!
//! # Algorithms
//!
//! - **Wu's Anti-aliased Line**: hairline strokes with sub-pixel accuracy
//! - **Scanline polygon fill**: non-zero winding, used for fills, thick strokes
//!   and glyphs
//! - **Bezier flattening**: de Casteljau evaluation of cubic segments
//!
//! # References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.

mod canvas;
pub mod font;
mod path;
mod primitives;
mod raster;
mod recording;

pub use canvas::{Canvas, Context, DrawState, StrokeStyle, TextStyle, DEFAULT_FONT_SIZE, DEFAULT_LINE_WIDTH};
pub use font::TextExtents;
pub use path::{cubic_point, Path, PathSegment, Polyline};
pub use primitives::{disc_contour, draw_line_aa, fill_disc, fill_polygon, segment_contour};
pub use raster::RasterCanvas;
pub use recording::{CanvasOp, RecordingCanvas};
