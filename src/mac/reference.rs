/// Floating-point twin of `MacEngine`
///
/// Keeps the same newest-first history as the MAC, applies tap 0 to the newest
/// sample and divides by the same `2^scale_shift`, but never quantizes. Differences between the two
/// outputs are exactly the error introduced by the fixed-point datapath.
pub struct ReferenceFir {
    taps: Vec<f64>,
    history: Vec<f64>,
    scale: f64,
}

impl ReferenceFir {
    /// Create a reference filter with the given tap coefficients
    pub fn new(taps: Vec<f64>, scale_shift: u32) -> Self {
        Self {
            history: vec![0.0; taps.len()],
            taps,
            scale: 2f64.powi(scale_shift as i32),
        }
    }

    /// Shift one sample into the history and return the normalized sum
    pub fn process(&mut self, sample: f64) -> f64 {
        if self.taps.is_empty() {
            return 0.0;
        }
        self.history.rotate_right(1);
        self.history[0] = sample;

        let sum: f64 = self
            .history
            .iter()
            .zip(&self.taps)
            .map(|(x, c)| x * c)
            .sum();
        sum / self.scale
    }

    /// Process an entire buffer of samples in-place
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.history.fill(0.0);
    }

    /// Current sample history, most recent first
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Get access to the tap coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }
}
