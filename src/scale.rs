//! Scale functions for data-to-visual mappings.
//!
//! Chart renderers map microsecond timestamps and sample values onto pixel
//! coordinates. Timestamps exceed `f32` precision, so scales work in `f64` and
//! callers narrow to `f32` only when handing coordinates to a canvas.

use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
///
/// The range may be inverted, as for screen-space y axes that grow downward.
///
/// # Example
///
/// ```
/// use trueno_strip::scale::{LinearScale, Scale};
///
/// let y = LinearScale::new((0.0, 100.0), (80.0, 0.0)).unwrap();
/// assert_eq!(y.scale(25.0), 60.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] if the domain is empty or not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain("Domain must be finite".to_string()));
        }
        if (domain.0 - domain.1).abs() < f64::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// Scale and narrow to canvas precision.
    #[must_use]
    pub fn scale_f32(&self, value: f64) -> f32 {
        self.scale(value) as f32
    }
}

impl Scale<f64, f64> for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}
