use super::Formatter;
use crate::mandelbrot::EscapeGrid;

/// Characters from fast escape to never escaped
const RAMP: &[u8] = b" .:-=+*#%@";

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn shade(count: u32, max_iter: u32) -> char {
        if count >= max_iter {
            return RAMP[RAMP.len() - 1] as char;
        }
        let index = (count as usize * (RAMP.len() - 1)) / max_iter.max(1) as usize;
        RAMP[index] as char
    }
}

impl Formatter for TextFormatter {
    fn format(&self, grid: &EscapeGrid) -> String {
        let mut out = String::with_capacity((grid.width + 1) * grid.height + 64);
        for row in grid.rows() {
            out.extend(row.iter().map(|&c| Self::shade(c, grid.max_iter)));
            out.push('\n');
        }
        if self.verbose {
            let inside = grid.counts.iter().filter(|&&c| c >= grid.max_iter).count();
            out.push_str(&format!(
                "{}x{} max_iter {}: {} of {} points bounded\n",
                grid.width,
                grid.height,
                grid.max_iter,
                inside,
                grid.counts.len()
            ));
        }
        out
    }
}
