use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use num_complex::Complex64;

use mandelfpga::config::{Backend, SimConfig};
use mandelfpga::fixed::FixedFormat;
use mandelfpga::mandelbrot::{Viewport, escape_time_at, render};
use mandelfpga::output::{GridFormat, render_grid};

#[derive(Parser, Debug)]
#[command(name = "mandelfpga")]
#[command(about = "Render the Mandelbrot set with a bit-exact model of the FPGA datapath", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Arithmetic backend: float, fixed
    #[arg(short = 'b', long, value_enum)]
    backend: Option<Backend>,

    /// Register format (e.g., "s18.15")
    #[arg(long)]
    register: Option<FixedFormat>,

    /// Iteration cap
    #[arg(short = 'i', long)]
    max_iter: Option<u32>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Evaluate a single point instead of the viewport
    #[arg(long, num_args = 2, value_names = ["RE", "IM"], allow_negative_numbers = true)]
    point: Option<Vec<f64>>,

    /// Render with both backends and report disagreeing pixels
    #[arg(long)]
    compare: bool,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: GridFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(backend) = args.backend {
        config.mandelbrot.backend = backend;
    }
    if let Some(format) = args.register {
        config.mandelbrot.format = format;
    }
    if let Some(max_iter) = args.max_iter {
        config.mandelbrot.max_iter = max_iter;
    }
    if let Some(width) = args.width {
        config.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.viewport.height = height;
    }
    config.validate().context("Invalid configuration")?;

    if let Some(point) = &args.point {
        let c = Complex64::new(point[0], point[1]);
        let count = escape_time_at(c, config.mandelbrot.backend, &config.mandelbrot)
            .with_context(|| format!("Failed to iterate {}", c))?;
        println!("{} {}", c, count);
        return Ok(());
    }

    let viewport = Viewport::new(&config.viewport)?;

    if args.compare {
        let fixed = render(&viewport, Backend::Fixed, &config.mandelbrot)?;
        let float = render(&viewport, Backend::Float, &config.mandelbrot)?;
        let mismatches = fixed.mismatches(&float)?;
        println!(
            "{} of {} pixels differ between {} and float ({:.2}%)",
            mismatches,
            fixed.counts.len(),
            config.mandelbrot.format,
            100.0 * mismatches as f64 / fixed.counts.len() as f64
        );
        return Ok(());
    }

    let grid = render(&viewport, config.mandelbrot.backend, &config.mandelbrot)?;
    print!("{}", render_grid(args.format, args.verbose > 0, &grid));
    if args.format == GridFormat::Json {
        println!();
    }

    Ok(())
}
