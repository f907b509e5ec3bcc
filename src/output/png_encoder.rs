//! PNG output encoder.
//!
//! Pure Rust PNG encoding using the `png` crate.

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// PNG encoder for framebuffer output.
#[derive(Debug, Clone, Copy)]
pub struct PngEncoder;

impl PngEncoder {
    /// Write a framebuffer to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if file creation or PNG encoding fails.
    pub fn write_to_file<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<()> {
        let path = path.as_ref();
        log::debug!("writing {}x{} PNG to {}", fb.width(), fb.height(), path.display());
        let file = File::create(path)?;
        Self::encode(fb, BufWriter::new(file))
    }

    /// Encode a framebuffer to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_bytes(fb: &Framebuffer) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        Self::encode(fb, &mut buffer)?;
        Ok(buffer)
    }

    /// Encode into any writer as 8-bit RGBA.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding or writing fails.
    pub fn encode<W: Write>(fb: &Framebuffer, writer: W) -> Result<()> {
        let mut encoder = png::Encoder::new(writer, fb.width(), fb.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        // Rows are padded to the stride; write them packed.
        writer.write_image_data(&fb.to_compact_pixels())?;
        writer.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_png_to_bytes() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::RED);

        let bytes = PngEncoder::to_bytes(&fb).unwrap();
        assert_eq!(&bytes[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_png_round_trip_through_file() {
        // Width not a multiple of the stride alignment exercises row packing.
        let mut fb = Framebuffer::new(13, 7).unwrap();
        fb.clear(Rgba::TRANSPARENT);
        fb.set_pixel(12, 6, Rgba::BLUE);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.png");
        PngEncoder::write_to_file(&fb, &path).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (13, 7));
        let last = &buf[info.buffer_size() - 4..info.buffer_size()];
        assert_eq!(last, &[0, 0, 255, 255]);
    }

    #[test]
    fn test_write_to_missing_directory_is_io_error() {
        let fb = Framebuffer::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.png");
        assert!(matches!(
            PngEncoder::write_to_file(&fb, path),
            Err(crate::Error::Io(_))
        ));
    }
}
