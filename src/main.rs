use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schedgrid::config::LayoutConfig;
use schedgrid::core::model::ScheduleDocument;
use schedgrid::ocr::{probe_image, OcrBridge};
use schedgrid::pipeline::{build_schedule, export_schedule, scan_schedule, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "schedgrid")]
#[command(version, about = "Weekly class schedule recovery from schedule screenshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a schedule from a JSON file of OCR text boxes
    Layout {
        /// Input JSON file with text boxes
        input: PathBuf,

        /// Output directory (default: ./<input_name>_schedule)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout thresholds as TOML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Enable debug outputs (HTML overlay, intermediate stages in JSON)
        #[arg(short, long)]
        debug: bool,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run OCR on a screenshot and build its schedule
    Scan {
        /// Screenshot of the weekly schedule
        image: PathBuf,

        /// Output directory (default: ./<input_name>_schedule)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout thresholds as TOML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// OCR bridge script
        #[arg(long)]
        script: Option<PathBuf>,

        /// Enable debug outputs
        #[arg(short, long)]
        debug: bool,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build schedules for several box files
    Batch {
        /// Input JSON files with text boxes
        inputs: Vec<PathBuf>,

        /// Output directory for all results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout thresholds as TOML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Enable debug outputs
        #[arg(short, long)]
        debug: bool,
    },

    /// Show information about a screenshot
    Info {
        /// Screenshot path
        image: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("schedgrid=info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            input,
            output,
            config,
            debug,
            quiet,
        } => {
            let config = load_layout_config(config.as_deref())?;
            layout_single(input, output, config, debug, quiet).map(|_| ())
        }
        Commands::Scan {
            image,
            output,
            config,
            script,
            debug,
            quiet,
        } => {
            let config = load_layout_config(config.as_deref())?;
            scan_single(image, output, config, script, debug, quiet).map(|_| ())
        }
        Commands::Batch {
            inputs,
            output,
            config,
            debug,
        } => layout_batch(inputs, output, config.as_deref(), debug),
        Commands::Info { image } => show_info(image),
    }
}

fn load_layout_config(path: Option<&Path>) -> Result<LayoutConfig> {
    match path {
        Some(path) => LayoutConfig::from_toml_file(path),
        None => Ok(LayoutConfig::default()),
    }
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "schedule".to_string());
    PathBuf::from(format!("{stem}_schedule"))
}

fn check_input(input: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    if !input.is_file() {
        anyhow::bail!("Input is not a file: {}", input.display());
    }
    Ok(())
}

fn finish(
    document: &ScheduleDocument,
    output_dir: &Path,
    debug: bool,
    quiet: bool,
) -> Result<usize> {
    let blocks = document.layout.class_blocks.len();
    if !quiet {
        println!("[+] Recovered {blocks} class block(s)");
        println!("[+] Exporting results...");
    }

    export_schedule(document, output_dir, debug)
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;

    if !quiet {
        println!("\n[✓] Done! Results saved to: {}", output_dir.display());
    }
    Ok(blocks)
}

fn layout_single(
    input: PathBuf,
    output: Option<PathBuf>,
    config: LayoutConfig,
    debug: bool,
    quiet: bool,
) -> Result<usize> {
    check_input(&input)?;
    let output_dir = output.unwrap_or_else(|| default_output(&input));

    if !quiet {
        println!("[*] Processing: {}", input.display());
        println!("[*] Output: {}", output_dir.display());
    }

    let pipeline = PipelineConfig::new(input.clone(), output_dir.clone())
        .with_layout(config)
        .with_debug(debug);

    let document = build_schedule(&pipeline)
        .with_context(|| format!("Failed to build schedule: {}", input.display()))?;

    finish(&document, &output_dir, debug, quiet)
}

fn scan_single(
    image: PathBuf,
    output: Option<PathBuf>,
    config: LayoutConfig,
    script: Option<PathBuf>,
    debug: bool,
    quiet: bool,
) -> Result<usize> {
    check_input(&image)?;
    let output_dir = output.unwrap_or_else(|| default_output(&image));

    if !quiet {
        println!("[*] Scanning: {}", image.display());
        println!("[*] Output: {}", output_dir.display());
    }

    let mut bridge = OcrBridge::new();
    if let Some(script) = script {
        bridge = bridge.with_script(script);
    }

    let pipeline = PipelineConfig::new(image.clone(), output_dir.clone())
        .with_layout(config)
        .with_debug(debug);

    let document = scan_schedule(&pipeline, &bridge)
        .with_context(|| format!("Failed to scan screenshot: {}", image.display()))?;

    finish(&document, &output_dir, debug, quiet)
}

/// Lays out every box file with one shared config, then prints a per-file
/// table of recovered block counts. Fails if any file failed.
fn layout_batch(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    config: Option<&Path>,
    debug: bool,
) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let base_output = output.unwrap_or_else(|| PathBuf::from("batch_schedules"));
    let layout_config = load_layout_config(config)?;

    println!("[*] Laying out {} box file(s) into {}", inputs.len(), base_output.display());

    let outcomes: Vec<(&PathBuf, Result<usize>)> = inputs
        .iter()
        .map(|input| {
            let output_dir = base_output.join(default_output(input));
            let outcome = layout_single(input.clone(), Some(output_dir), layout_config.clone(), debug, true);
            (input, outcome)
        })
        .collect();

    println!();
    let mut total_blocks: usize = 0;
    let mut failed = 0;
    for (input, outcome) in &outcomes {
        match outcome {
            Ok(blocks) => {
                total_blocks += blocks;
                let marker = if *blocks == 0 { "!" } else { "✓" };
                println!("  [{marker}] {:>3} block(s)  {}", blocks, input.display());
            }
            Err(e) => {
                failed += 1;
                eprintln!("  [✗] failed      {}: {e:#}", input.display());
            }
        }
    }

    println!(
        "\n[*] {} file(s), {} class block(s), {} failed",
        outcomes.len(),
        total_blocks,
        failed
    );

    if failed > 0 {
        anyhow::bail!("{} of {} box file(s) failed", failed, outcomes.len());
    }

    Ok(())
}

fn show_info(image: PathBuf) -> Result<()> {
    check_input(&image)?;

    let (width, height) = probe_image(&image)?;

    println!("Screenshot Information");
    println!("======================");
    println!("File: {}", image.display());
    println!("Size: {}x{}", width, height);

    Ok(())
}
