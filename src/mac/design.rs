use crate::constants::{MAX_NORMALIZED_FREQ, MIN_NORMALIZED_FREQ};
use crate::error::{Result, SimError};
use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};

/// Design a linear-phase low-pass filter for the MAC block
///
/// Uses the Parks-McClellan (Remez) algorithm to design an optimal
/// equiripple FIR filter. Frequencies are normalized to the sample rate
/// (cycles per sample, 0..0.5).
///
/// # Arguments
/// * `num_taps` - Number of filter taps; matches the MAC depth
/// * `cutoff` - Passband edge
/// * `transition` - Transition bandwidth between passband and stopband
///
/// # Errors
/// Returns `SimError::FilterDesign` if filter parameters are invalid
pub fn design_lowpass(num_taps: usize, cutoff: f64, transition: f64) -> Result<Vec<f64>> {
    if num_taps < 2 {
        return Err(SimError::FilterDesign(format!(
            "Need at least 2 taps, got {}",
            num_taps
        )));
    }

    let pass_end = cutoff.max(MIN_NORMALIZED_FREQ);
    let stop_start = (cutoff + transition).min(MAX_NORMALIZED_FREQ);

    if pass_end >= stop_start {
        return Err(SimError::FilterDesign(format!(
            "Invalid filter frequencies: cutoff={}, transition={}",
            cutoff, transition
        )));
    }

    let bands = [
        BandSetting::new(0.0, pass_end, constant(1.0))
            .map_err(|e| SimError::FilterDesign(format!("Passband: {:?}", e)))?,
        BandSetting::new(stop_start, 0.5, constant(0.0))
            .map_err(|e| SimError::FilterDesign(format!("Stopband: {:?}", e)))?,
    ];

    let params = pm_parameters(num_taps, &bands)
        .map_err(|e| SimError::FilterDesign(format!("PM parameters: {:?}", e)))?;

    let design =
        pm_remez(&params).map_err(|e| SimError::FilterDesign(format!("PM Remez: {:?}", e)))?;

    Ok(design.impulse_response)
}

/// Pre-multiply taps by 2^scale_shift and round, as the hardware stores them
pub fn scale_coefficients(taps: &[f64], scale_shift: u32) -> Vec<f64> {
    let scale = 2f64.powi(scale_shift as i32);
    taps.iter().map(|&t| (t * scale).round()).collect()
}
