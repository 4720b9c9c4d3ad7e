mod csv;
mod json;
mod text;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

use crate::mandelbrot::EscapeGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GridFormat {
    Text,
    Csv,
    Json,
}

pub trait Formatter: Send {
    fn format(&self, grid: &EscapeGrid) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: GridFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        GridFormat::Text => Box::new(TextFormatter::new(verbose)),
        GridFormat::Json => Box::new(JsonFormatter),
        GridFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Header (if any) followed by the formatted grid
pub fn render_grid(format: GridFormat, verbose: bool, grid: &EscapeGrid) -> String {
    let formatter = create_formatter(format, verbose);
    match formatter.header() {
        Some(header) => format!("{}\n{}", header, formatter.format(grid)),
        None => formatter.format(grid),
    }
}
