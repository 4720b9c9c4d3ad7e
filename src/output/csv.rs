use super::Formatter;
use crate::mandelbrot::EscapeGrid;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, grid: &EscapeGrid) -> String {
        let mut out = String::new();
        for (y, row) in grid.rows().enumerate() {
            for (x, count) in row.iter().enumerate() {
                out.push_str(&format!("{},{},{}\n", x, y, count));
            }
        }
        out
    }

    fn header(&self) -> Option<&'static str> {
        Some("x,y,iterations")
    }
}
