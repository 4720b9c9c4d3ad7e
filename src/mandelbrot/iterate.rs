use num_complex::Complex64;

use super::datapath::{Datapath, FixedDatapath, FloatDatapath};
use crate::config::{Backend, MandelbrotConfig};
use crate::error::Result;

/// Stopping rule of the escape-time loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeParams {
    pub max_iter: u32,
    pub radius: f64,
}

impl From<&MandelbrotConfig> for EscapeParams {
    fn from(config: &MandelbrotConfig) -> Self {
        Self {
            max_iter: config.max_iter,
            radius: config.radius,
        }
    }
}

/// One step of `Z <- Z^2 + C`, resizing after every operator
///
/// The order of resizes follows the pipeline stages of the hardware:
/// squares, their difference, the real sum, the cross product, its
/// doubling and the imaginary sum each land in a register.
pub fn step<D: Datapath>(
    dp: &D,
    cr: &D::Value,
    ci: &D::Value,
    zr: &D::Value,
    zi: &D::Value,
) -> Result<(D::Value, D::Value)> {
    let zrr = dp.resize(dp.mul(zr, zr));
    let zii = dp.resize(dp.mul(zi, zi));
    let zr_temp = dp.resize(dp.sub(&zrr, &zii)?);
    let zr_next = dp.resize(dp.add(&zr_temp, cr)?);

    let zri = dp.resize(dp.mul(zr, zi));
    let zi_temp = dp.resize(dp.add(&zri, &zri)?);
    let zi_next = dp.resize(dp.add(&zi_temp, ci)?);

    Ok((zr_next, zi_next))
}

/// Number of iterations until `|Z|` reaches the radius, capped at `max_iter`
///
/// Starts from `Z = 0`; a point that escapes on the first step returns 1.
pub fn escape_time<D: Datapath>(
    dp: &D,
    cr: &D::Value,
    ci: &D::Value,
    params: &EscapeParams,
) -> Result<u32> {
    let mut zr = dp.zero();
    let mut zi = dp.zero();

    for iteration in 1..=params.max_iter {
        let (zr_next, zi_next) = step(dp, cr, ci, &zr, &zi)?;
        if dp.escaped(&zr_next, &zi_next, params.radius)? {
            log::trace!(
                "escaped after {} iterations at ({}, {})",
                iteration,
                dp.to_f64(&zr_next),
                dp.to_f64(&zi_next)
            );
            return Ok(iteration);
        }
        zr = zr_next;
        zi = zi_next;
    }

    Ok(params.max_iter)
}

/// Escape time of a single point with the configured backend
pub fn escape_time_at(c: Complex64, backend: Backend, config: &MandelbrotConfig) -> Result<u32> {
    let params = EscapeParams::from(config);
    match backend {
        Backend::Float => escape_time(&FloatDatapath, &c.re, &c.im, &params),
        Backend::Fixed => {
            let dp = FixedDatapath::new(config.format);
            let cr = dp.from_f64(c.re)?;
            let ci = dp.from_f64(c.im)?;
            escape_time(&dp, &cr, &ci, &params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FixedFormat;

    fn params(max_iter: u32) -> EscapeParams {
        EscapeParams {
            max_iter,
            radius: 2.0,
        }
    }

    #[test]
    fn test_minus_one_never_escapes() {
        let config = MandelbrotConfig {
            max_iter: 50,
            ..MandelbrotConfig::default()
        };
        let c = Complex64::new(-1.0, 0.0);
        assert_eq!(escape_time_at(c, Backend::Fixed, &config).unwrap(), 50);
        assert_eq!(escape_time_at(c, Backend::Float, &config).unwrap(), 50);
    }

    #[test]
    fn test_far_point_escapes_immediately() {
        let dp = FloatDatapath;
        assert_eq!(escape_time(&dp, &2.5, &0.0, &params(100)).unwrap(), 1);
    }

    #[test]
    fn test_step_matches_float_for_exact_values() {
        let dp = FixedDatapath::new(FixedFormat::signed_q(3, 15).unwrap());
        let cr = dp.from_f64(-0.5).unwrap();
        let ci = dp.from_f64(0.25).unwrap();
        let zr = dp.from_f64(0.5).unwrap();
        let zi = dp.from_f64(-0.75).unwrap();

        let (fr, fi) = step(&FloatDatapath, &-0.5, &0.25, &0.5, &-0.75).unwrap();
        let (xr, xi) = step(&dp, &cr, &ci, &zr, &zi).unwrap();
        assert_eq!(xr.to_f64(), fr);
        assert_eq!(xi.to_f64(), fi);
    }

    #[test]
    fn test_point_two_escapes_at_first_step() {
        let config = MandelbrotConfig::default();
        let c = Complex64::new(2.0, 0.0);
        assert_eq!(escape_time_at(c, Backend::Fixed, &config).unwrap(), 1);
    }
}
