//! Core framebuffer for pixel rendering.
//!
//! Provides the RGBA pixel buffer that chart surfaces cache between repaints and
//! that hosts composite onto their own drawing area.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Row alignment in bytes.
const ROW_ALIGNMENT: usize = 64;

/// RGBA framebuffer with a 64-byte aligned row stride.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// RGBA pixels in row-major order, 4 bytes per pixel.
    pixels: Vec<u8>,
    /// Stride in bytes (may include padding for alignment).
    stride: usize,
}

impl Framebuffer {
    /// Create a new, fully transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_strip::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(800, 600).unwrap();
    /// assert_eq!(fb.width(), 800);
    /// assert_eq!(fb.height(), 600);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        // Calculate stride with alignment padding
        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + ROW_ALIGNMENT - 1) & !(ROW_ALIGNMENT - 1);

        let pixels = vec![0; stride * (height as usize)];

        Ok(Self {
            width,
            height,
            pixels,
            stride,
        })
    }

    /// Get the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the stride (row width in bytes, including any padding).
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Get the total number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Clear the framebuffer to a solid color, replacing alpha as well.
    pub fn clear(&mut self, color: Rgba) {
        let [r, g, b, a] = color.to_array();
        let row_bytes = (self.width as usize) * 4;

        for y in 0..self.height as usize {
            let row_start = y * self.stride;
            for chunk in self.pixels[row_start..row_start + row_bytes].chunks_exact_mut(4) {
                chunk[0] = r;
                chunk[1] = g;
                chunk[2] = b;
                chunk[3] = a;
            }
        }
    }

    /// Get the color at a specific pixel coordinate.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.pixel_index(x, y);
        Some(Rgba::from_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    /// Set the color at a specific pixel coordinate.
    ///
    /// Does nothing if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        let [r, g, b, a] = color.to_array();
        self.pixels[idx] = r;
        self.pixels[idx + 1] = g;
        self.pixels[idx + 2] = b;
        self.pixels[idx + 3] = a;
    }

    /// Blend a color at a specific pixel coordinate using alpha blending.
    ///
    /// Uses the standard "over" compositing operation:
    /// `out = src * src_alpha + dst * dst_alpha * (1 - src_alpha)`
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }

        let idx = self.pixel_index(x, y);
        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(self.pixels[idx + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        if out_a > 0.0 {
            let blend = |src: u8, dst: u8| -> u8 {
                let src_f = f32::from(src) / 255.0;
                let dst_f = f32::from(dst) / 255.0;
                let out = (src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a;
                (out * 255.0).round().clamp(0.0, 255.0) as u8
            };

            self.pixels[idx] = blend(color.r, self.pixels[idx]);
            self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
            self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
            self.pixels[idx + 3] = (out_a * 255.0).round() as u8;
        }
    }

    /// Blend a horizontal run of pixels `[x0, x1)` on row `y`.
    ///
    /// Coordinates are clamped to the framebuffer.
    pub fn blend_span(&mut self, x0: i32, x1: i32, y: i32, color: Rgba) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let start = x0.max(0);
        let end = x1.min(self.width as i32);
        for x in start..end {
            self.blend_pixel(x as u32, y as u32, color);
        }
    }

    /// Composite `src` over this framebuffer with its top-left corner at
    /// `(dx, dy)`. Pixels falling outside either buffer are skipped.
    pub fn composite(&mut self, src: &Framebuffer, dx: i32, dy: i32) {
        for sy in 0..src.height {
            let ty = sy as i32 + dy;
            if ty < 0 || ty >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width {
                let tx = sx as i32 + dx;
                if tx < 0 || tx >= self.width as i32 {
                    continue;
                }
                let idx = src.pixel_index(sx, sy);
                if src.pixels[idx + 3] == 0 {
                    continue;
                }
                let color = Rgba::from_array([
                    src.pixels[idx],
                    src.pixels[idx + 1],
                    src.pixels[idx + 2],
                    src.pixels[idx + 3],
                ]);
                self.blend_pixel(tx as u32, ty as u32, color);
            }
        }
    }

    /// Number of pixels with non-zero alpha.
    #[must_use]
    pub fn covered_pixels(&self) -> usize {
        (0..self.height)
            .map(|y| {
                let row_start = (y as usize) * self.stride;
                self.pixels[row_start..row_start + (self.width as usize) * 4]
                    .chunks_exact(4)
                    .filter(|px| px[3] != 0)
                    .count()
            })
            .sum()
    }

    /// Calculate the byte index for a pixel coordinate.
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }

    /// Get pixel data as a compact buffer without stride padding.
    ///
    /// This is useful for encoding to formats like PNG that expect
    /// tightly-packed pixel data.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;

        if self.stride == row_bytes {
            return self.pixels[..row_bytes * (self.height as usize)].to_vec();
        }

        let mut compact = Vec::with_capacity(row_bytes * (self.height as usize));
        for y in 0..self.height {
            let start = (y as usize) * self.stride;
            compact.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        compact
    }
}
