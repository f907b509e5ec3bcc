//! Color types and hex parsing.
//!
//! Colors are stored as straight (non-premultiplied) 8-bit RGBA. Chart
//! configuration expresses colors as CSS-style hex strings, so parsing and
//! formatting live here as well.

use crate::error::{Error, Result};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    /// Neutral mid gray, the default stroke for strip charts.
    pub const GRAY: Self = Self::new(128, 128, 128, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Create a color with alpha given as a fraction in `0.0..=1.0`.
    #[must_use]
    pub fn with_alpha_f32(self, alpha: f32) -> Self {
        self.with_alpha((alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Alpha as a fraction in `0.0..=1.0`.
    #[must_use]
    pub fn alpha_f32(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for any other length or a non-hex digit.
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_strip::color::Rgba;
    ///
    /// let c = Rgba::from_hex("#76b900").unwrap();
    /// assert_eq!(c, Rgba::rgb(0x76, 0xb9, 0x00));
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || Error::InvalidColor(hex.to_string());

        let nibble = |c: u8| -> Result<u8> {
            (c as char).to_digit(16).map(|d| d as u8).ok_or_else(invalid)
        };
        let byte = |i: usize| -> Result<u8> {
            let bytes = digits.as_bytes();
            Ok(nibble(bytes[i])? << 4 | nibble(bytes[i + 1])?)
        };

        match digits.len() {
            3 => {
                let b = digits.as_bytes();
                let expand = |c: u8| -> Result<u8> { nibble(c).map(|n| n << 4 | n) };
                Ok(Self::rgb(expand(b[0])?, expand(b[1])?, expand(b[2])?))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }

    /// Format as `#rrggbbaa`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}
