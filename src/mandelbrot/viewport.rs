use num_complex::Complex64;
use serde::Serialize;

use super::datapath::{Datapath, FixedDatapath, FloatDatapath};
use super::iterate::{EscapeParams, escape_time};
use crate::config::{Backend, MandelbrotConfig, ViewportConfig};
use crate::error::{Result, SimError};

/// `n` evenly spaced values from `start` to `end`, both included
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            values[n - 1] = end;
            values
        }
    }
}

/// Pixel grid over a region of the complex plane
///
/// Column 0 is `real_min`; row 0 is the top edge, `imag_max`.
#[derive(Debug, Clone)]
pub struct Viewport {
    real: Vec<f64>,
    imag: Vec<f64>,
}

impl Viewport {
    pub fn new(config: &ViewportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            real: linspace(config.real_min, config.real_max, config.width),
            imag: linspace(config.imag_max, config.imag_min, config.height),
        })
    }

    pub fn width(&self) -> usize {
        self.real.len()
    }

    pub fn height(&self) -> usize {
        self.imag.len()
    }

    /// Complex coordinate of pixel `(x, y)`
    pub fn point(&self, x: usize, y: usize) -> Option<Complex64> {
        Some(Complex64::new(*self.real.get(x)?, *self.imag.get(y)?))
    }

    pub fn real_axis(&self) -> &[f64] {
        &self.real
    }

    pub fn imag_axis(&self) -> &[f64] {
        &self.imag
    }
}

/// Escape counts of a rendered viewport, row-major from the top-left pixel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscapeGrid {
    pub width: usize,
    pub height: usize,
    pub max_iter: u32,
    pub counts: Vec<u32>,
}

impl EscapeGrid {
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.counts.get(y * self.width + x).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.counts.chunks(self.width.max(1))
    }

    /// Pixels whose counts differ between two renders of the same viewport
    ///
    /// # Errors
    /// Returns `SimError::ShapeMismatch` if the grids differ in size
    pub fn mismatches(&self, other: &EscapeGrid) -> Result<usize> {
        if self.counts.len() != other.counts.len() || self.width != other.width {
            return Err(SimError::ShapeMismatch {
                expected: self.counts.len(),
                actual: other.counts.len(),
            });
        }
        Ok(self
            .counts
            .iter()
            .zip(&other.counts)
            .filter(|(a, b)| a != b)
            .count())
    }
}

/// Escape count of every pixel of the viewport
pub fn render(
    viewport: &Viewport,
    backend: Backend,
    config: &MandelbrotConfig,
) -> Result<EscapeGrid> {
    config.validate()?;
    let params = EscapeParams::from(config);
    log::info!(
        "Rendering {}x{} with {:?} backend ({}, max_iter {})",
        viewport.width(),
        viewport.height(),
        backend,
        config.format,
        config.max_iter
    );

    match backend {
        Backend::Float => render_with(&FloatDatapath, viewport, &params),
        Backend::Fixed => render_with(&FixedDatapath::new(config.format), viewport, &params),
    }
}

fn render_with<D: Datapath>(
    dp: &D,
    viewport: &Viewport,
    params: &EscapeParams,
) -> Result<EscapeGrid> {
    // Coordinates are loaded into registers once per column and row
    let reals = viewport
        .real_axis()
        .iter()
        .map(|&r| dp.from_f64(r))
        .collect::<Result<Vec<_>>>()?;
    let imags = viewport
        .imag_axis()
        .iter()
        .map(|&i| dp.from_f64(i))
        .collect::<Result<Vec<_>>>()?;

    let mut counts = Vec::with_capacity(reals.len() * imags.len());
    for (row, ci) in imags.iter().enumerate() {
        for cr in &reals {
            counts.push(escape_time(dp, cr, ci, params)?);
        }
        log::debug!("row {}/{} done", row + 1, imags.len());
    }

    Ok(EscapeGrid {
        width: reals.len(),
        height: imags.len(),
        max_iter: params.max_iter,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_viewport() -> Viewport {
        Viewport::new(&ViewportConfig {
            width: 9,
            height: 5,
            ..ViewportConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_viewport_corners() {
        let viewport = small_viewport();
        assert_eq!(viewport.point(0, 0), Some(Complex64::new(-2.2, 0.9375)));
        assert_eq!(viewport.point(8, 4), Some(Complex64::new(1.0, -0.9375)));
        assert_eq!(viewport.point(9, 0), None);
    }

    #[test]
    fn test_render_shape() {
        let config = MandelbrotConfig {
            max_iter: 20,
            ..MandelbrotConfig::default()
        };
        let grid = render(&small_viewport(), Backend::Float, &config).unwrap();
        assert_eq!(grid.width, 9);
        assert_eq!(grid.height, 5);
        assert_eq!(grid.counts.len(), 45);
        assert_eq!(grid.rows().count(), 5);
        assert!(grid.counts.iter().all(|&c| (1..=20).contains(&c)));
    }

    #[test]
    fn test_mismatch_shape_check() {
        let a = EscapeGrid {
            width: 2,
            height: 1,
            max_iter: 10,
            counts: vec![1, 10],
        };
        let b = EscapeGrid {
            counts: vec![1, 9],
            ..a.clone()
        };
        assert_eq!(a.mismatches(&b).unwrap(), 1);

        let c = EscapeGrid {
            width: 1,
            height: 1,
            max_iter: 10,
            counts: vec![1],
        };
        assert!(a.mismatches(&c).is_err());
    }
}
