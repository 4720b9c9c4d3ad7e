use crate::error::{Result, SimError};
use crate::fixed::{FixedFormat, FixedPoint};

/// Arithmetic capabilities the Mandelbrot recurrence needs
///
/// Implemented once for plain `f64` and once for hardware registers, so the
/// iteration is written a single time and both models run the exact same
/// sequence of operations.
pub trait Datapath {
    type Value: Clone;

    /// Load a coordinate into a register
    fn from_f64(&self, value: f64) -> Result<Self::Value>;

    fn zero(&self) -> Self::Value;

    fn add(&self, a: &Self::Value, b: &Self::Value) -> Result<Self::Value>;

    fn sub(&self, a: &Self::Value, b: &Self::Value) -> Result<Self::Value>;

    fn mul(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;

    /// Bring a full-precision intermediate back to register width
    fn resize(&self, value: Self::Value) -> Self::Value;

    /// True when `zr^2 + zi^2 >= radius^2`
    fn escaped(&self, zr: &Self::Value, zi: &Self::Value, radius: f64) -> Result<bool>;

    /// Approximate value, for logging and comparisons
    fn to_f64(&self, value: &Self::Value) -> f64;
}

/// Double-precision reference; resizing is the identity
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatDatapath;

impl Datapath for FloatDatapath {
    type Value = f64;

    fn from_f64(&self, value: f64) -> Result<f64> {
        Ok(value)
    }

    fn zero(&self) -> f64 {
        0.0
    }

    fn add(&self, a: &f64, b: &f64) -> Result<f64> {
        Ok(a + b)
    }

    fn sub(&self, a: &f64, b: &f64) -> Result<f64> {
        Ok(a - b)
    }

    fn mul(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn resize(&self, value: f64) -> f64 {
        value
    }

    fn escaped(&self, zr: &f64, zi: &f64, radius: f64) -> Result<bool> {
        Ok(zr * zr + zi * zi >= radius * radius)
    }

    fn to_f64(&self, value: &f64) -> f64 {
        *value
    }
}

/// Bit-exact registers of a single format
///
/// Every intermediate is resized back to `format` with `FixedPoint::resize`,
/// matching a pipeline where each stage writes a register of that width.
#[derive(Debug, Clone, Copy)]
pub struct FixedDatapath {
    format: FixedFormat,
}

impl FixedDatapath {
    pub fn new(format: FixedFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> FixedFormat {
        self.format
    }
}

impl Datapath for FixedDatapath {
    type Value = FixedPoint;

    fn from_f64(&self, value: f64) -> Result<FixedPoint> {
        FixedPoint::from_f64(self.format, value)
    }

    fn zero(&self) -> FixedPoint {
        FixedPoint::zero(self.format)
    }

    fn add(&self, a: &FixedPoint, b: &FixedPoint) -> Result<FixedPoint> {
        a.add(b)
    }

    fn sub(&self, a: &FixedPoint, b: &FixedPoint) -> Result<FixedPoint> {
        a.sub(b)
    }

    fn mul(&self, a: &FixedPoint, b: &FixedPoint) -> FixedPoint {
        a.mul(b)
    }

    fn resize(&self, value: FixedPoint) -> FixedPoint {
        value.resize(self.format)
    }

    /// Compares at full product precision: the squares are not resized, and
    /// the threshold is encoded in the format of their sum. A threshold that
    /// format cannot hold is above every reachable sum, so nothing escapes.
    fn escaped(&self, zr: &FixedPoint, zi: &FixedPoint, radius: f64) -> Result<bool> {
        let magnitude = zr.mul(zr).add(&zi.mul(zi))?;
        let threshold = match FixedPoint::from_f64(magnitude.format(), radius * radius) {
            Ok(threshold) => threshold,
            Err(SimError::Capacity { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };
        Ok(magnitude.to_integer()? >= threshold.to_integer()?)
    }

    fn to_f64(&self, value: &FixedPoint) -> f64 {
        value.to_f64()
    }
}
