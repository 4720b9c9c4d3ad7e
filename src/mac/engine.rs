use crate::config::MacConfig;
use crate::error::{Result, SimError};
use crate::fixed::FixedPoint;

/// Fixed-point multiply-accumulate block
///
/// Models an N-tap FIR pipeline as synthesized: a shift register of samples
/// (most recent first), one stored coefficient per tap, a multiplier per
/// tap whose full-width product is truncated to the accumulator window, and
/// a final normalization by the coefficient scale factor.
///
/// # Example
/// ```
/// use mandelfpga::config::MacConfig;
/// use mandelfpga::mac::MacEngine;
///
/// let config = MacConfig { depth: 2, ..MacConfig::default() };
/// let mut mac = MacEngine::new(config).unwrap();
/// mac.init(&[1024.0, 1024.0]).unwrap();
/// let out = mac.eval_array(&[1.0, 1.0]).unwrap();
/// assert_eq!(out, vec![0.5, 1.0]);
/// ```
pub struct MacEngine {
    config: MacConfig,
    history: Vec<FixedPoint>,
    coefficients: Option<Vec<FixedPoint>>,
    scale: f64,
}

impl MacEngine {
    /// Create an engine with a zeroed history and no coefficients
    ///
    /// # Errors
    /// Returns `SimError::Config` if the geometry is invalid
    pub fn new(config: MacConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            history: vec![FixedPoint::zero(config.sample_format); config.depth],
            coefficients: None,
            scale: 2f64.powi(config.scale_shift as i32),
            config,
        })
    }

    /// Load the coefficient table, replacing any previous one
    ///
    /// # Errors
    /// - `SimError::ShapeMismatch` if `coefficients.len() != depth`
    /// - any conversion error of a coefficient into the coefficient format
    pub fn init(&mut self, coefficients: &[f64]) -> Result<()> {
        if coefficients.len() != self.config.depth {
            return Err(SimError::ShapeMismatch {
                expected: self.config.depth,
                actual: coefficients.len(),
            });
        }

        let table = coefficients
            .iter()
            .map(|&c| FixedPoint::from_f64(self.config.coef_format, c))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Loaded {} coefficients as {}",
            table.len(),
            self.config.coef_format
        );
        self.coefficients = Some(table);
        Ok(())
    }

    /// Push one sample through the pipeline and return the output
    ///
    /// # Errors
    /// - `SimError::CoefficientsNotLoaded` before `init`
    /// - any conversion error of the sample into the sample format; the
    ///   history is left untouched in that case
    pub fn eval(&mut self, sample: f64) -> Result<f64> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(SimError::CoefficientsNotLoaded)?;
        let sample = FixedPoint::from_f64(self.config.sample_format, sample)?;

        self.history.rotate_right(1);
        self.history[0] = sample;

        let accumulator = self.config.accumulator_format;
        let sum: f64 = self
            .history
            .iter()
            .zip(coefficients)
            .map(|(x, c)| x.mul(c).resize(accumulator).to_f64())
            .sum();

        let output = sum / self.scale;
        log::trace!("MAC output {}", output);
        Ok(output)
    }

    /// `eval` each sample in order; history carries over between calls
    pub fn eval_array(&mut self, samples: &[f64]) -> Result<Vec<f64>> {
        samples.iter().map(|&s| self.eval(s)).collect()
    }

    /// Zero the sample history, keeping the coefficients
    pub fn reset(&mut self) {
        self.history.fill(FixedPoint::zero(self.config.sample_format));
        log::debug!("MAC history cleared");
    }

    pub fn depth(&self) -> usize {
        self.config.depth
    }

    pub fn config(&self) -> &MacConfig {
        &self.config
    }

    /// Current sample history, most recent first
    pub fn history(&self) -> Vec<f64> {
        self.history.iter().map(FixedPoint::to_f64).collect()
    }

    /// Loaded coefficients as quantized by the coefficient format
    pub fn coefficients(&self) -> Option<Vec<f64>> {
        self.coefficients
            .as_ref()
            .map(|table| table.iter().map(FixedPoint::to_f64).collect())
    }
}
