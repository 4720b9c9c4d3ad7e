//! Configuration for the datapath models.
//!
//! Every section has defaults matching the reference hardware, so a config
//! file only needs the fields it changes:
//!
//! ```toml
//! [mandelbrot]
//! format = { bits = 20, signed = true, frac_bits = 17 }
//! max_iter = 250
//!
//! [viewport]
//! width = 160
//! height = 48
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ESCAPE_RADIUS, DEFAULT_MAX_ITER, MAC_SCALE_SHIFT, MANDELBROT_FRAC_BITS,
    MANDELBROT_INTEGER_BITS,
};
use crate::error::{Result, SimError};
use crate::fixed::FixedFormat;

/// Arithmetic backend for the Mandelbrot iterator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Double-precision reference model
    Float,
    /// Bit-exact model of the hardware registers
    Fixed,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Mandelbrot iterator configuration
    pub mandelbrot: MandelbrotConfig,
    /// Region of the complex plane to render
    pub viewport: ViewportConfig,
    /// Multiply-accumulate block geometry
    pub mac: MacConfig,
}

/// Mandelbrot iterator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MandelbrotConfig {
    /// Register format of Zr, Zi, Cr and Ci
    pub format: FixedFormat,
    /// Iteration cap
    pub max_iter: u32,
    /// Escape radius
    pub radius: f64,
    /// Backend used when none is given on the command line
    pub backend: Backend,
}

/// Region of the complex plane and its pixel grid
///
/// Pixel centres include both ends of each range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub real_min: f64,
    pub real_max: f64,
    pub imag_min: f64,
    pub imag_max: f64,
    /// Horizontal pixel count
    pub width: usize,
    /// Vertical pixel count
    pub height: usize,
}

/// Multiply-accumulate block geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacConfig {
    /// Format of incoming samples
    pub sample_format: FixedFormat,
    /// Format of the stored coefficients
    pub coef_format: FixedFormat,
    /// Window each product is truncated to before summation
    pub accumulator_format: FixedFormat,
    /// Number of taps
    pub depth: usize,
    /// Output is divided by 2^scale_shift
    pub scale_shift: u32,
}

impl SimConfig {
    /// Read a TOML file; missing sections and fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SimError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SimError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.mandelbrot.validate()?;
        self.viewport.validate()?;
        self.mac.validate()
    }
}

impl MandelbrotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(SimError::Config("max_iter must be positive".to_string()));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SimError::Config(format!(
                "escape radius must be positive, got {}",
                self.radius
            )));
        }
        if !self.format.is_signed() {
            return Err(SimError::Config(
                "Mandelbrot registers must be signed".to_string(),
            ));
        }
        Ok(())
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::Config(format!(
                "viewport must have pixels, got {}x{}",
                self.width, self.height
            )));
        }
        if self.real_min >= self.real_max || self.imag_min >= self.imag_max {
            return Err(SimError::Config(format!(
                "empty viewport: real {}..{}, imag {}..{}",
                self.real_min, self.real_max, self.imag_min, self.imag_max
            )));
        }
        Ok(())
    }
}

impl MacConfig {
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(SimError::Config("MAC depth must be at least 1".to_string()));
        }
        if self.scale_shift > 1023 {
            return Err(SimError::Config(format!(
                "scale shift {} out of range",
                self.scale_shift
            )));
        }
        Ok(())
    }
}

impl Default for MandelbrotConfig {
    fn default() -> Self {
        Self {
            format: FixedFormat::signed_q(MANDELBROT_INTEGER_BITS, MANDELBROT_FRAC_BITS)
                .unwrap_or_else(|_| unreachable!("default register format is valid")),
            max_iter: DEFAULT_MAX_ITER,
            radius: DEFAULT_ESCAPE_RADIUS,
            backend: Backend::Fixed,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            real_min: -2.2,
            real_max: 1.0,
            imag_min: -0.9375,
            imag_max: 0.9375,
            width: 1024,
            height: 600,
        }
    }
}

impl Default for MacConfig {
    fn default() -> Self {
        let format = |bits, frac_bits| {
            FixedFormat::new(bits, true, frac_bits)
                .unwrap_or_else(|_| unreachable!("default MAC format is valid"))
        };
        Self {
            sample_format: format(16, 12),
            coef_format: format(16, 0),
            accumulator_format: format(28, 8),
            depth: 32,
            scale_shift: MAC_SCALE_SHIFT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mandelbrot.format.to_string(), "s18.15");
        assert_eq!(config.mac.scale_shift, 11);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml(
            r#"
            [mandelbrot]
            max_iter = 250
            backend = "float"

            [mac]
            depth = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.mandelbrot.max_iter, 250);
        assert_eq!(config.mandelbrot.backend, Backend::Float);
        assert_eq!(config.mandelbrot.radius, 2.0);
        assert_eq!(config.mac.depth, 8);
        assert_eq!(config.viewport.width, 1024);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(SimConfig::from_toml("[mandelbrot]\nmax_iter = 0").is_err());
        assert!(SimConfig::from_toml("[mandelbrot]\nradius = -1.0").is_err());
        assert!(SimConfig::from_toml("[viewport]\nreal_min = 2.0\nreal_max = 1.0").is_err());
        assert!(SimConfig::from_toml("[mac]\ndepth = 0").is_err());
        assert!(
            SimConfig::from_toml("[mandelbrot]\nformat = { bits = 8, frac_bits = 4 }").is_err()
        );
    }

    #[test]
    fn test_unparseable_toml() {
        let err = SimConfig::from_toml("[mandelbrot\n").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }
}
