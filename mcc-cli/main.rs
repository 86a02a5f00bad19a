//! Compare two fingerprints from their grayscale images and minutia lists.
//!
//! ```bash
//! mcc a.png a.json b.png b.json --top-k 10 --json
//! ```
//!
//! Minutia files hold a JSON array of `[row, col]` pairs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use mcc_cli::input::{load_gray_image, load_minutiae};
use mcc_cli::overlay::save_overlay;
use mcc_cli::{CliResult, MinutiaPolicy, PipelineBuilder, PipelineConfig, PipelineOverrides};

#[derive(Parser)]
#[command(name = "mcc")]
#[command(about = "Score the similarity of two fingerprints with minutia cylinder descriptors")]
struct Args {
    /// First fingerprint image
    image_a: PathBuf,
    /// Minutiae of the first fingerprint (JSON `[[row, col], ...]`)
    minutiae_a: PathBuf,
    /// Second fingerprint image
    image_b: PathBuf,
    /// Minutiae of the second fingerprint
    minutiae_b: PathBuf,

    /// Pipeline configuration file (.json or .toml); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Orientation block size in pixels
    #[arg(long)]
    block_size: Option<usize>,

    /// Cylinder radius in pixels
    #[arg(long)]
    radius: Option<u32>,

    /// Cylinder cells per axis
    #[arg(long)]
    bins: Option<usize>,

    /// Number of best pair similarities averaged
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Worker threads (0 = Rayon default)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Handling of minutiae outside the image
    #[arg(long, value_enum)]
    policy: Option<MinutiaPolicy>,

    /// Compute directional filter bank responses
    #[arg(long)]
    filter_bank: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write `<PREFIX>_a.png` and `<PREFIX>_b.png` debug overlays
    #[arg(long, value_name = "PREFIX")]
    overlay: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn builder_from_args(args: &Args) -> CliResult<PipelineBuilder> {
    let base = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::new(),
    };
    let overrides = PipelineOverrides {
        block_size: args.block_size,
        radius: args.radius,
        bins: args.bins,
        top_k: args.top_k,
        threads: args.threads,
        minutia_policy: args.policy,
        filter_bank: args.filter_bank,
    };
    Ok(base.to_builder().with_overrides(&overrides))
}

fn run(args: &Args) -> CliResult<()> {
    let builder = builder_from_args(args)?;
    info!("{}", builder.summary());
    let matcher = builder.build()?;

    let img_a = load_gray_image(&args.image_a)?;
    let img_b = load_gray_image(&args.image_b)?;
    let minutiae_a = load_minutiae(&args.minutiae_a)?;
    let minutiae_b = load_minutiae(&args.minutiae_b)?;
    info!(
        "loaded {}x{} with {} minutiae, {}x{} with {} minutiae",
        img_a.width(),
        img_a.height(),
        minutiae_a.len(),
        img_b.width(),
        img_b.height(),
        minutiae_b.len()
    );

    let started = Instant::now();
    let a = matcher.describe(&img_a, &minutiae_a)?;
    let b = matcher.describe(&img_b, &minutiae_b)?;
    let report = matcher.report(&a, &b, started);

    if let Some(prefix) = &args.overlay {
        for (suffix, img, template) in [("a", &img_a, &a), ("b", &img_b, &b)] {
            let mut name = prefix.clone().into_os_string();
            name.push(format!("_{}.png", suffix));
            let path = PathBuf::from(name);
            save_overlay(img, template, &path)?;
            info!("saved overlay {}", path.display());
        }
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("Score: {:.6}", report.score);
        println!(
            "Minutiae: {} / {} ({} / {} matchable)",
            report.minutiae_a, report.minutiae_b, report.matchable_a, report.matchable_b
        );
        println!("Time taken: {:.2}ms", report.elapsed_ms);
    }
    Ok(())
}
