use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use scoresweep::binary_paths::resolve_binary;
use scoresweep::diamond::DiamondOracle;
use scoresweep::grid::GridLayout;
use scoresweep::platform::platform_info;
use scoresweep::plot::{figure_title, save_figure, CellSeries, Figure, OutputFormat, PlotStyle};
use scoresweep::sampler::{Sampler, SweepParams};
use scoresweep::sensitivity::{parse_sensitivity_list, ScorerConfig, Sensitivity};

/// Parse an integer that must be at least 1
fn parse_positive(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("Invalid number: {e}"))?;
    if n == 0 {
        return Err("Value must be at least 1".to_string());
    }
    Ok(n)
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("Invalid number: {e}"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err("Timeout must be a positive number of seconds".to_string());
    }
    Ok(Duration::from_secs_f64(secs))
}

/// scoresweep - typical DIAMOND bitscores for a range of amino acid identities
///
/// Generates random protein pairs with a controlled number of mismatches,
/// scores them with `diamond blastx` under each sensitivity setting and plots
/// bitscore and match rate against mismatch count.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of amino acids in the test sequences
    #[clap(long, default_value = "100", value_parser = parse_positive)]
    length: usize,

    /// Additional (non-sensitivity) arguments to pass to 'diamond blastx'
    #[clap(long = "blastx-args", default_value = "", allow_hyphen_values = true)]
    blastx_args: String,

    /// Number of random sequences to test for each mismatch count
    #[clap(long, default_value = "10", value_parser = parse_positive)]
    iterations: usize,

    /// Area of the scatter plot dots in pt² (matplotlib `s`)
    #[clap(long, default_value = "3")]
    dotsize: u32,

    /// Write intermediate processing output to standard error
    #[clap(short, long)]
    verbose: bool,

    /// File to write the plot to. Format is determined by suffix (svg, png, jpg, bmp)
    #[clap(short, long, default_value = "plot.svg")]
    output: PathBuf,

    /// Number of additional mismatches to add at each step
    #[clap(long = "error-increment", default_value = "1", value_parser = parse_positive)]
    error_increment: usize,

    /// DIAMOND executable (default: search PATH)
    #[clap(long)]
    diamond: Option<PathBuf>,

    /// Seconds to wait for 'diamond blastx' before repeating the trial
    #[clap(long, default_value = "2", value_parser = parse_seconds)]
    timeout: Duration,

    /// Seed for the random number generator
    #[clap(long)]
    seed: Option<u64>,

    /// Comma-separated sensitivities to plot, in order (default: all, cheapest first)
    #[clap(long)]
    sensitivities: Option<String>,

    /// Number of plot columns
    #[clap(long, default_value = "3", value_parser = parse_positive)]
    columns: usize,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Fail before hours of sampling rather than at save time
    OutputFormat::from_path(&args.output)?;

    let sensitivities = match args.sensitivities.as_deref() {
        Some(list) => parse_sensitivity_list(list)?,
        None => Sensitivity::BY_COST.to_vec(),
    };
    let extra_args: Vec<String> = args
        .blastx_args
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let configs: Vec<ScorerConfig> = sensitivities
        .into_iter()
        .map(|s| ScorerConfig::new(s, extra_args.clone()))
        .collect();

    let params = SweepParams {
        length: args.length,
        error_increment: args.error_increment,
        iterations: args.iterations,
    };
    params.validate()?;

    let binary = resolve_binary("diamond", args.diamond.as_deref())?;
    let oracle = DiamondOracle::new(binary, args.timeout)?;
    let version = oracle.version().context("Could not determine DIAMOND version")?;
    log::info!("Using DIAMOND v{} at {}", version, oracle.binary().display());

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut sampler = Sampler::new(oracle, rng);

    let layout = GridLayout::new(configs.len(), args.columns);
    let mut cells = Vec::with_capacity(configs.len());

    for config in &configs {
        log::info!("Processing sensitivity: {}.", config.label());
        let samples = sampler.sweep(&params, config)?;
        log::info!(
            "  {}: {} matches, {} misses, {} timeouts in {:.1}s",
            config.label(),
            samples.total_matches(),
            samples.total_misses(),
            samples.timeouts,
            samples.elapsed.as_secs_f64()
        );
        cells.push(CellSeries::from_sample_set(samples, config));
    }

    let platform = platform_info();
    let timestamp = Local::now().format("%a %b %e %H:%M:%S %Y").to_string();
    let figure = Figure {
        title: figure_title(
            &version,
            &params,
            &timestamp,
            &platform.system,
            &platform.release,
        ),
        layout,
        cells,
    };

    let style = PlotStyle {
        dotsize: args.dotsize,
    };
    save_figure(&args.output, &figure, &style)?;
    log::info!("Wrote {}", args.output.display());

    Ok(())
}
