// Command-line front end for the image-to-PDF labeller
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use image_csv_pdf::prelude::*;
use image_csv_pdf::pipeline;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image2pdf")]
#[command(about = "Turn a folder of images into labelled PDFs using a CSV lookup table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    verbose: bool,

    /// TOML configuration file with render defaults and font paths
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one labelled PDF per matched image into the image folder
    Convert {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show which images match a CSV row without writing anything
    Scan {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "image2pdf.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct Inputs {
    /// Folder holding the images (not searched recursively)
    #[arg(short, long)]
    images: Option<PathBuf>,

    /// CSV file with ImageName,X,Y rows after a header line
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl Inputs {
    fn into_request(self, options: RenderOptions) -> RunRequest {
        RunRequest {
            image_dir: self.images,
            csv_path: self.csv,
            options,
        }
    }
}

#[derive(Args)]
struct RenderArgs {
    /// Image scaling mode
    #[arg(long, value_enum)]
    scale: Option<ScaleMode>,

    #[arg(long)]
    font_family: Option<String>,

    /// Font size in points
    #[arg(long)]
    font_size: Option<u8>,

    #[arg(long)]
    bold: bool,

    #[arg(long)]
    italic: bool,

    #[arg(long)]
    underline: bool,

    /// Text colour as #RRGGBB
    #[arg(long)]
    color: Option<Rgb>,

    /// Center each label line inside the text box
    #[arg(long)]
    center: bool,

    /// Left edge of the text box, in points
    #[arg(long, allow_hyphen_values = true)]
    text_x: Option<String>,

    /// Bottom edge of the text box, in points from the page bottom
    #[arg(long, allow_hyphen_values = true)]
    text_y: Option<String>,

    /// Width of the text box, in points
    #[arg(long, allow_hyphen_values = true)]
    text_width: Option<String>,
}

impl RenderArgs {
    fn apply(self, options: &mut RenderOptions) {
        if let Some(scale) = self.scale {
            options.scale_mode = scale;
        }
        if let Some(family) = self.font_family {
            options.font.family = family;
        }
        if let Some(size) = self.font_size {
            options.font.size = size;
        }
        options.font.bold |= self.bold;
        options.font.italic |= self.italic;
        options.font.underline |= self.underline;
        if let Some(color) = self.color {
            options.color = color;
        }
        options.center |= self.center;
        if let Some(x) = self.text_x {
            options.text_box.x = x;
        }
        if let Some(y) = self.text_y {
            options.text_box.y = y;
        }
        if let Some(width) = self.text_width {
            options.text_box.width = width;
        }
    }
}

/// Set up logging and tracing
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_level(true)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn print_leftovers(unmatched: &[String], unused: &[CsvRecord]) {
    if !unmatched.is_empty() {
        println!("⚠️  {} images without a CSV row:", unmatched.len());
        for name in unmatched {
            println!("  ❓ {}", name);
        }
    }
    if !unused.is_empty() {
        println!("📋 {} CSV rows without an image:", unused.len());
        for record in unused {
            println!("  • {} (X = {}, Y = {})", record.image_name, record.x, record.y);
        }
    }
}

fn convert(config: &AppConfig, inputs: Inputs, render: RenderArgs) -> Result<()> {
    let mut options = config.render.to_options();
    render.apply(&mut options);
    let request = inputs.into_request(options);

    let mut emitter = GenpdfEmitter::new(config.fonts.resolver());
    println!("🖼️ → 📕 Converting images to PDF ({})...", request.options.scale_mode);
    let summary = pipeline::run(&request, &mut emitter)?;

    for path in &summary.written {
        println!("  📕 {}", path.display());
    }
    print_leftovers(&summary.unmatched_images, &summary.unused_records);
    println!(
        "✅ Done: {} PDFs written for {} images",
        summary.written.len(),
        summary.images_found
    );
    Ok(())
}

fn scan(inputs: Inputs) -> Result<()> {
    let request = inputs.into_request(RenderOptions::default());
    let prepared = pipeline::prepare(&request)?;

    println!("🔍 {} images in {}", prepared.images.len(), prepared.image_dir.display());
    for pair in &prepared.report.pairs {
        println!(
            "  ✅ {} → X = {}, Y = {}",
            pair.image.path.display(),
            pair.record.x,
            pair.record.y
        );
    }
    print_leftovers(&prepared.report.unmatched_names(), &prepared.report.unused_records);
    Ok(())
}

fn init_config(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
    }
    AppConfig::default().save_to_file(&output)?;
    println!("✅ Default configuration written to {}", output.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Commands::Convert { inputs, render } => convert(&config, inputs, render),
        Commands::Scan { inputs } => scan(inputs),
        Commands::InitConfig { output, force } => init_config(output, force),
    });

    if let Err(e) = result {
        error!("Run aborted: {:#}", e);
        eprintln!("❌ Error: {:#}", e);
        if e
            .downcast_ref::<ConverterError>()
            .map_or(false, ConverterError::is_precondition)
        {
            eprintln!("Nothing was written. Check your selections and try again.");
        }
        std::process::exit(1);
    }
}
