//! Output encoders (PNG, SVG).

mod png_encoder;
mod svg;

pub use png_encoder::PngEncoder;
pub use svg::{path_data, SvgCanvas, SvgElement, SvgEncoder};
