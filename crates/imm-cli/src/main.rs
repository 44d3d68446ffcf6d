mod samples;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imm_core::{ExportConfig, LayerType};
use imm_encode::ImmFileReader;
use imm_ir::{ExportSession, SessionBuilder};

#[derive(Parser)]
#[command(
    name = "imm",
    version,
    about = "IMM: author and inspect immersive paint documents",
    long_about = concat!(
        "Build .imm documents from code and inspect the files the exporter writes.\n",
        "Export settings are read from an optional TOML config ([sequence], [audio], [budget])."
    )
)]
struct Cli {
    /// Path to an export config file (TOML); defaults apply when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single stroke on a root paint layer
    ExportStroke {
        /// Output .imm file
        #[arg()]
        output: PathBuf,
    },

    /// Export a single stroke nested inside two group layers
    ExportGroups {
        /// Output .imm file
        #[arg()]
        output: PathBuf,
    },

    /// Print the header and layer tree of an .imm file
    Inspect {
        /// Path to the .imm file
        #[arg()]
        file: PathBuf,

        /// Print the layer summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the content hash of the document inside an .imm file
    Hash {
        /// Path to the .imm file
        #[arg()]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `inspect --json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::ExportStroke { output } => {
            cmd_export(cli.config.as_deref(), &output, samples::single_stroke)
        }
        Commands::ExportGroups { output } => {
            cmd_export(cli.config.as_deref(), &output, samples::grouped_stroke)
        }
        Commands::Inspect { file, json } => cmd_inspect(&file, json),
        Commands::Hash { file } => cmd_hash(&file),
    }
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    match path {
        Some(path) => ExportConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(ExportConfig::default()),
    }
}

fn cmd_export(
    config: Option<&Path>,
    output: &Path,
    build: fn(&SessionBuilder) -> imm_core::ImmResult<ExportSession>,
) -> Result<()> {
    let config = load_config(config)?;
    let builder = SessionBuilder::from_config(&config).context("invalid [sequence] settings")?;
    let session = build(&builder).context("failed to build document")?;

    let bytes = session
        .export_to_file(output, config.audio.bitrate, config.audio.codec)
        .with_context(|| format!("failed to export: {}", output.display()))?;

    let stats = session.snapshot()?.stats();
    println!("✓ Wrote {} ({} bytes)", output.display(), bytes);
    println!(
        "  {} layer(s), {} frame(s), {} stroke(s), {} triangle(s)",
        stats.layers, stats.frames, stats.render_calls, stats.triangles
    );
    Ok(())
}

fn cmd_inspect(file: &Path, json: bool) -> Result<()> {
    let (header, doc) = ImmFileReader::read(file)
        .with_context(|| format!("failed to read: {}", file.display()))?;
    let infos = doc.layer_infos();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("IMM document {}", doc.id);
    println!(
        "  container v{}  caps {:#04x}  audio {:?} @ {} bps",
        header.version, header.caps, header.audio.codec, header.audio.bitrate
    );
    println!(
        "  {} @ {}fps  background {}",
        doc.sequence.sequence_type, doc.sequence.frame_rate, doc.sequence.background
    );

    let mut depths: Vec<usize> = Vec::with_capacity(infos.len());
    for info in &infos {
        let depth = info.parent_id.map_or(0, |p| depths[p] + 1);
        depths.push(depth);
        let indent = "  ".repeat(depth + 1);
        match info.kind {
            LayerType::Group => println!(
                "{}[group] {} ({} children)",
                indent, info.name, info.num_children
            ),
            LayerType::Paint => println!(
                "{}[paint] {} ({} frames, {} strokes, {} drawings created)",
                indent,
                info.name,
                info.paint_num_frames,
                info.paint_num_strokes,
                info.paint_num_drawings
            ),
        }
    }

    let stats = doc.stats();
    println!(
        "  totals: {} render calls, {} triangles, ~{} bytes",
        stats.render_calls, stats.triangles, stats.memory
    );
    Ok(())
}

fn cmd_hash(file: &Path) -> Result<()> {
    let (_, doc) = ImmFileReader::read(file)
        .with_context(|| format!("failed to read: {}", file.display()))?;
    let hash = imm_core::hash::hash_document(&doc)?;
    println!("{}  {}", hash, file.display());
    Ok(())
}
