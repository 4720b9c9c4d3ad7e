use super::Formatter;
use crate::mandelbrot::EscapeGrid;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, grid: &EscapeGrid) -> String {
        let rows: Vec<&[u32]> = grid.rows().collect();
        serde_json::json!({
            "width": grid.width,
            "height": grid.height,
            "max_iter": grid.max_iter,
            "rows": rows,
        })
        .to_string()
    }
}
