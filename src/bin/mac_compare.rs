use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;

use mandelfpga::config::SimConfig;
use mandelfpga::mac::{MacEngine, ReferenceFir, design_lowpass, scale_coefficients};

#[derive(Parser, Debug)]
#[command(name = "mac_compare")]
#[command(about = "Compare the fixed-point MAC block against a floating-point FIR", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Passband edge in cycles per sample
    #[arg(long, default_value = "0.1")]
    cutoff: f64,

    /// Transition bandwidth in cycles per sample
    #[arg(long, default_value = "0.05")]
    transition: f64,

    /// Number of test samples
    #[arg(short = 'n', long, default_value = "1024")]
    samples: usize,

    /// Test tone frequencies in cycles per sample
    #[arg(long, value_delimiter = ',', default_value = "0.02,0.3")]
    tones: Vec<f64>,

    /// Peak amplitude of the summed tones
    #[arg(long, default_value = "0.9")]
    amplitude: f64,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct Comparison {
    taps: usize,
    sample_format: String,
    coef_format: String,
    accumulator_format: String,
    scale_shift: u32,
    coefficients: Vec<f64>,
    error: Option<StatsSummary>,
    abs_error: Option<StatsSummary>,
    reference_rms: f64,
    fixed_rms: f64,
}

fn test_signal(len: usize, tones: &[f64], amplitude: f64) -> Vec<f64> {
    let gain = amplitude / tones.len().max(1) as f64;
    (0..len)
        .map(|n| {
            tones
                .iter()
                .map(|&f| gain * (2.0 * PI * f * n as f64).sin())
                .sum()
        })
        .collect()
}

fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
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

    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let mac_config = config.mac;

    let taps = design_lowpass(mac_config.depth, args.cutoff, args.transition)
        .context("Filter design failed")?;
    let coefficients = scale_coefficients(&taps, mac_config.scale_shift);
    log::info!(
        "Designed {} taps, cutoff {} transition {}",
        coefficients.len(),
        args.cutoff,
        args.transition
    );

    let mut mac = MacEngine::new(mac_config.clone())?;
    mac.init(&coefficients)?;
    let mut reference = ReferenceFir::new(coefficients.clone(), mac_config.scale_shift);

    let input = test_signal(args.samples, &args.tones, args.amplitude);
    let fixed = mac.eval_array(&input).context("MAC evaluation failed")?;
    let mut expected = input;
    reference.process_buffer(&mut expected);

    let mut error_stats: Stats<f64> = Stats::new();
    let mut abs_stats: Stats<f64> = Stats::new();
    for (got, want) in fixed.iter().zip(&expected) {
        error_stats.update(got - want);
        abs_stats.update((got - want).abs());
    }

    let comparison = Comparison {
        taps: mac_config.depth,
        sample_format: mac_config.sample_format.to_string(),
        coef_format: mac_config.coef_format.to_string(),
        accumulator_format: mac_config.accumulator_format.to_string(),
        scale_shift: mac_config.scale_shift,
        coefficients,
        error: StatsSummary::from_stats(&error_stats),
        abs_error: StatsSummary::from_stats(&abs_stats),
        reference_rms: rms(&expected),
        fixed_rms: rms(&fixed),
    };

    match args.format {
        OutputFormat::Text => print_text(&comparison),
        OutputFormat::Json => print_json(&comparison)?,
    }

    Ok(())
}

fn print_text(result: &Comparison) {
    println!(
        "MAC {} taps: sample {}, coef {}, acc {}, scale 2^{}",
        result.taps,
        result.sample_format,
        result.coef_format,
        result.accumulator_format,
        result.scale_shift
    );
    println!("{}", "-".repeat(60));
    println!(
        "{:<12} {:>11} {:>11} {:>11} {:>11}",
        "", "Mean", "Std", "Min", "Max"
    );
    for (label, stats) in [("error", &result.error), ("|error|", &result.abs_error)] {
        match stats {
            Some(s) => println!(
                "{:<12} {:>11.6} {:>11.6} {:>11.6} {:>11.6}",
                label, s.mean, s.std_dev, s.min, s.max
            ),
            None => println!("{:<12} -", label),
        }
    }
    println!(
        "RMS reference {:.6}, fixed {:.6}",
        result.reference_rms, result.fixed_rms
    );
}

fn print_json(result: &Comparison) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}
