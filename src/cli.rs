use crate::config::{Config, load_config, validate};
use crate::ir::NodeNaming;
use crate::layout_dump::write_layout_dump;
use crate::render::write_output_svg;
use crate::scan::ScanOptions;
use crate::theme::Theme;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "include-chord",
    version,
    about = "Draw the #include graph of a source tree as a chord diagram"
)]
pub struct Args {
    /// Output file (.svg or .png)
    #[arg(value_name = "OUTPUT", required_unless_present = "output_flag")]
    pub output: Option<PathBuf>,

    /// Output file, same as the positional argument
    #[arg(short = 'o', long = "output", id = "output_flag", conflicts_with = "output")]
    pub output_flag: Option<PathBuf>,

    /// Source folder
    #[arg(long = "sources", default_value = ".")]
    pub sources: PathBuf,

    /// Regex; matching file paths and included names are dropped
    #[arg(long = "exclude", default_value = "")]
    pub exclude: String,

    /// Ignore includes that do not name a file of the source folder
    #[arg(long = "ignore-external")]
    pub ignore_external: bool,

    /// Ignore includes without a file extension (standard headers)
    #[arg(long = "ignore-std")]
    pub ignore_std: bool,

    /// Output format. Defaults to the output file extension, then svg.
    #[arg(short = 'e', long = "outputFormat", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Built-in theme (classic, light)
    #[arg(long = "theme")]
    pub theme: Option<String>,

    /// Canvas width and height
    #[arg(short = 's', long = "canvas-size")]
    pub canvas_size: Option<f32>,

    /// Do not cluster files by folder
    #[arg(long = "no-folder-groups")]
    pub no_folder_groups: bool,

    /// How files are named on the diagram
    #[arg(long = "naming", value_enum)]
    pub naming: Option<NodeNaming>,

    /// Source file extension to scan (repeatable, replaces the default list)
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Also write node positions and chords as JSON
    #[arg(long = "dump-layout", value_name = "PATH")]
    pub dump_layout: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Svg,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let output = args
        .output
        .clone()
        .or_else(|| args.output_flag.clone())
        .ok_or_else(|| anyhow::anyhow!("Output filename is required"))?;
    let format = args
        .output_format
        .unwrap_or_else(|| OutputFormat::from_path(&output));

    let config = resolve_config(&args)?;
    let mut options = ScanOptions::new(&args.sources)
        .with_exclude(&args.exclude)
        .context("Parsing options")?;
    options.extensions = config.scan.extensions.clone();
    options.ignore_external = args.ignore_external;
    options.ignore_std = args.ignore_std;
    options.naming = args.naming.unwrap_or_default();

    let start = Instant::now();
    let diagram = crate::build_diagram(&options, &config)?;

    match format {
        OutputFormat::Svg => write_output_svg(&diagram.svg, &output)?,
        OutputFormat::Png => write_png(&diagram.svg, &output, config.layout.canvas_size)?,
    }

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &diagram.layout, &diagram.chords, &diagram.graph)
            .with_context(|| format!("failed to write layout dump {}", path.display()))?;
    }

    info!(
        nodes = diagram.graph.nodes.len(),
        curves = diagram.chords.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        output = %output.display(),
        "diagram written"
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("include_chord={level}")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config =
        load_config(args.config.as_deref()).context("failed to load config file")?;
    if let Some(name) = args.theme.as_deref() {
        config.theme =
            Theme::from_name(name).ok_or_else(|| anyhow::anyhow!("unknown theme '{name}'"))?;
    }
    if let Some(size) = args.canvas_size {
        config.layout.canvas_size = size;
    }
    if args.no_folder_groups {
        config.layout.group_by_folder = false;
    }
    if !args.extensions.is_empty() {
        config.scan.extensions = args
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();
    }
    validate(&config)?;
    Ok(config)
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, size: f32) -> Result<()> {
    crate::render::write_output_png(svg, output, size)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _size: f32) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}
