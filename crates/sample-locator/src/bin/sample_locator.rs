//! sample-locator CLI: locate catalog samples in a target feature file.

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use sample_locator::io::{load_catalog, load_target, LocateConfig, LocateReport};
use sample_locator::core::parse_level;
use sample_locator::LocatorParams;
use std::path::PathBuf;
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sample-locator")]
#[command(about = "Locate known reference samples in a target image from precomputed features")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every catalog sample against a target and report detections.
    Locate(LocateArgs),

    /// Print the default locator parameters as JSON.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct LocateArgs {
    /// JSON run configuration; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of sample feature files (*.json, searched recursively).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Target feature file (JSON).
    #[arg(long)]
    target: Option<PathBuf>,

    /// Path to write the report (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Distance-ratio threshold for the nearest-neighbour test.
    #[arg(long)]
    ratio: Option<f32>,

    /// Minimal projected area in square target pixels.
    #[arg(long)]
    min_area: Option<f64>,

    /// RANSAC inlier threshold in pixels.
    #[arg(long)]
    ransac_thresh: Option<f64>,

    /// Maximum RANSAC iterations.
    #[arg(long)]
    ransac_iters: Option<usize>,

    /// RANSAC sampling seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Process samples one after another.
    #[arg(long)]
    sequential: bool,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl LocateArgs {
    fn resolve_config(&self) -> CliResult<LocateConfig> {
        let mut config = match &self.config {
            Some(path) => LocateConfig::load_json(path).map_err(|e| -> CliError {
                format!("failed to load config {}: {e}", path.display()).into()
            })?,
            None => LocateConfig {
                catalog_dir: String::new(),
                target_path: String::new(),
                output_path: None,
                params: LocatorParams::default(),
            },
        };

        if let Some(dir) = &self.catalog {
            config.catalog_dir = dir.display().to_string();
        }
        if let Some(target) = &self.target {
            config.target_path = target.display().to_string();
        }
        if let Some(out) = &self.out {
            config.output_path = Some(out.display().to_string());
        }
        if config.catalog_dir.is_empty() || config.target_path.is_empty() {
            return Err("both --catalog and --target are required (or a --config providing them)".into());
        }

        let params = &mut config.params;
        if let Some(ratio) = self.ratio {
            params.ratio = ratio;
        }
        if let Some(min_area) = self.min_area {
            params.verify.min_area_px = min_area;
        }
        if let Some(thresh) = self.ransac_thresh {
            params.ransac.reproj_threshold_px = thresh;
        }
        if let Some(iters) = self.ransac_iters {
            params.ransac.max_iters = iters;
        }
        if let Some(seed) = self.seed {
            params.ransac.seed = seed;
        }
        if self.sequential {
            params.parallel = false;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Locate(args) => {
            init_logging(parse_level(&args.log_level)?)?;
            run_locate(&args)
        }
        Commands::DefaultConfig => run_default_config(),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(level: LevelFilter) -> CliResult<()> {
    sample_locator::core::init_tracing(false, level);
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LevelFilter) -> CliResult<()> {
    sample_locator::core::init_with_level(level)?;
    Ok(())
}

fn run_default_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&LocatorParams::default())?);
    Ok(())
}

fn run_locate(args: &LocateArgs) -> CliResult<()> {
    let config = args.resolve_config()?;
    let locator = config.build_locator()?;

    let samples = load_catalog(&config.catalog_dir)?;
    let target = load_target(&config.target_path)?;
    log::info!(
        "Loaded {} samples; target has {} keypoints",
        samples.len(),
        target.len()
    );

    let result = locator.locate(&samples, &target)?;

    if result.any_found {
        for det in &result.detections {
            println!(
                "{}: center ({:.1}, {:.1}), area {:.1} px^2, {} inliers",
                det.name, det.centroid.x, det.centroid.y, det.area, det.inliers
            );
        }
    } else {
        println!("no matches found for any sample");
    }

    let out = config.output_path();
    LocateReport::new(&config, &target, &result).write_json(&out)?;
    log::info!("Report written to {}", out.display());
    Ok(())
}
