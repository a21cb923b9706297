use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uifuse::config::FusionConfig;
use uifuse::pipeline::{build_response, export_response, load_request, FuseSummary, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "uifuse")]
#[command(version, about = "Fuse object-detector boxes with interface-tree boxes into ranked objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fuse one request document
    Fuse {
        /// Request JSON with `detections`, `dom` and optional `viewport`
        input: PathBuf,

        /// Output directory (default: ./<input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        fusion: FusionArgs,

        /// Write the HTML overlay under <output>/debug
        #[arg(short, long)]
        debug: bool,

        /// Screenshot drawn behind the overlay
        #[arg(long)]
        screenshot: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Fuse multiple request documents
    Batch {
        /// Request JSON files
        inputs: Vec<PathBuf>,

        /// Output directory for all results
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        fusion: FusionArgs,

        /// Write HTML overlays
        #[arg(short, long)]
        debug: bool,
    },

    /// Show what a request document contains
    Info {
        /// Request JSON file
        input: PathBuf,

        #[command(flatten)]
        fusion: FusionArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct FusionArgs {
    /// TOML file with fusion settings
    #[arg(short, long, env = "UIFUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Minimum overlap for a detection to adopt element metadata
    #[arg(long)]
    match_threshold: Option<f64>,

    /// Number of leading elements considered for fallback entries
    #[arg(long)]
    fallback_cap: Option<usize>,

    /// Score of structural-only entries
    #[arg(long)]
    fallback_score: Option<f64>,

    /// Overlap above which a fallback element is treated as a duplicate
    #[arg(long)]
    dedup_threshold: Option<f64>,
}

impl FusionArgs {
    fn resolve(&self) -> Result<FusionConfig> {
        let mut config = match &self.config {
            Some(path) => FusionConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => FusionConfig::default(),
        };
        if let Some(value) = self.match_threshold {
            config = config.with_match_threshold(value);
        }
        if let Some(value) = self.fallback_cap {
            config = config.with_fallback_cap(value);
        }
        if let Some(value) = self.fallback_score {
            config = config.with_fallback_score(value);
        }
        if let Some(value) = self.dedup_threshold {
            config = config.with_dedup_threshold(value);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uifuse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fuse {
            input,
            output,
            fusion,
            debug,
            screenshot,
            quiet,
        } => {
            let config = fusion.resolve()?;
            fuse_single(input, output, config, debug, screenshot, quiet)
        }
        Commands::Batch {
            inputs,
            output,
            fusion,
            debug,
        } => {
            let config = fusion.resolve()?;
            fuse_batch(inputs, output, config, debug)
        }
        Commands::Info { input, fusion } => {
            let config = fusion.resolve()?;
            show_info(input, config)
        }
    }
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "request".to_string())
}

fn fuse_single(
    input: PathBuf,
    output: Option<PathBuf>,
    fusion: FusionConfig,
    debug: bool,
    screenshot: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("Input is not a file: {}", input.display());
    }

    let output_dir = output.unwrap_or_else(|| PathBuf::from(format!("{}_output", input_stem(&input))));

    if !quiet {
        println!("[*] Processing: {}", input.display());
        println!("[*] Output: {}", output_dir.display());
    }

    let config = PipelineConfig::new(input.clone(), output_dir.clone(), fusion)
        .with_debug(debug)
        .with_screenshot(screenshot);

    let (request, response) = build_response(&config)
        .with_context(|| format!("Failed to fuse request: {}", input.display()))?;

    if !quiet {
        let summary = FuseSummary::of(&response.objects);
        println!(
            "[+] {} objects in {} ms ({} yolo+dom, {} yolo, {} dom)",
            response.objects.len(),
            response.ms,
            summary.fused,
            summary.detector_only,
            summary.structural_only
        );
    }

    export_response(&request, &response, &config)
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;

    if !quiet {
        println!("[✓] Done! Results saved to: {}", output_dir.display());
    }

    Ok(())
}

fn fuse_batch(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    fusion: FusionConfig,
    debug: bool,
) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let base_output = output.unwrap_or_else(|| PathBuf::from("batch_output"));

    println!("[*] Batch processing {} file(s)", inputs.len());
    println!("[*] Base output: {}\n", base_output.display());

    let mut success = 0;
    let mut failed = 0;

    for (i, input) in inputs.iter().enumerate() {
        println!("[{}/{}] Processing: {}", i + 1, inputs.len(), input.display());

        if !input.exists() {
            warn!(input = %input.display(), "skipping missing input");
            eprintln!("  [!] Skipped: file does not exist");
            failed += 1;
            continue;
        }

        let output_dir = base_output.join(input_stem(input));

        match fuse_single(input.clone(), Some(output_dir), fusion, debug, None, true) {
            Ok(_) => {
                println!("  [✓] Success");
                success += 1;
            }
            Err(e) => {
                eprintln!("  [✗] Failed: {:#}", e);
                failed += 1;
            }
        }
    }

    println!("\n[*] Summary: {} succeeded, {} failed", success, failed);

    if failed > 0 {
        anyhow::bail!("{} file(s) failed to process", failed);
    }

    Ok(())
}

fn show_info(input: PathBuf, fusion: FusionConfig) -> Result<()> {
    let request = load_request(&input)
        .with_context(|| format!("Failed to read request: {}", input.display()))?;

    let with_geometry = request.dom.iter().filter(|e| e.corners().is_some()).count();
    let in_window = request
        .dom
        .iter()
        .take(fusion.fallback_cap)
        .filter(|e| e.corners().is_some())
        .count();

    println!("Request Information");
    println!("===================");
    println!("File: {}", input.display());
    println!("Detections: {}", request.detections.len());
    println!("Elements: {}", request.dom.len());
    println!("Elements with geometry: {}", with_geometry);
    println!(
        "Fallback candidates: {} (first {} elements)",
        in_window, fusion.fallback_cap
    );
    if let Some(viewport) = request.viewport {
        println!(
            "Viewport: {}x{} @{}x",
            viewport.width, viewport.height, viewport.dpr
        );
    }

    Ok(())
}
