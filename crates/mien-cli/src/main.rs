use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mien_core::{matcher, Embedding, Gallery, Matcher, QueryFace, ScoringStrategy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

mod config;
use config::Config;

#[derive(Parser)]
#[command(name = "mien", about = "Mien face-identification matching CLI")]
struct Cli {
    /// Optional TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Accept/reject distance threshold (overrides config)
    #[arg(long, global = true)]
    threshold: Option<f32>,
    /// Scoring strategy: asymmetric or linear-threshold (overrides config)
    #[arg(long, global = true)]
    strategy: Option<ScoringStrategy>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match query faces against a gallery of known embeddings
    Match {
        /// JSON file: array of {"label", "embedding"} entries
        #[arg(long)]
        gallery: PathBuf,
        /// JSON file: array of {"embedding", "bbox"} query faces
        #[arg(long)]
        queries: PathBuf,
    },
    /// Summarize a gallery file
    Inspect {
        #[arg(long)]
        gallery: PathBuf,
    },
    /// Print the confidence score for a single distance
    Score {
        /// Distance between a query and its nearest gallery entry
        #[arg(long)]
        distance: f32,
    },
}

/// One line of a gallery file: `{"label": "alice", "embedding": [..]}`.
#[derive(Deserialize)]
struct GalleryFileEntry {
    label: String,
    embedding: Embedding,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }

    match cli.command {
        Commands::Match { gallery, queries } => run_match(&config, &gallery, &queries),
        Commands::Inspect { gallery } => run_inspect(&gallery),
        Commands::Score { distance } => run_score(&config, distance),
    }
}

/// Read a gallery file, returning the built gallery and the raw pair count
/// (so callers can report how many entries the build skipped).
fn load_gallery(path: &Path) -> Result<(Gallery, usize)> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading gallery at {}", path.display()))?;
    let pairs: Vec<GalleryFileEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing gallery {}", path.display()))?;
    let total = pairs.len();
    let gallery = Gallery::build(pairs.into_iter().map(|e| (e.label, e.embedding)));
    Ok((gallery, total))
}

fn run_match(config: &Config, gallery_path: &Path, queries_path: &Path) -> Result<()> {
    let (gallery, _) = load_gallery(gallery_path)?;
    let matcher = Matcher::new(gallery, config.threshold, config.strategy)?;

    let raw = std::fs::read_to_string(queries_path)
        .with_context(|| format!("reading queries at {}", queries_path.display()))?;
    let queries: Vec<QueryFace> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing queries {}", queries_path.display()))?;

    tracing::info!(
        subjects = matcher.gallery().len(),
        faces = queries.len(),
        "matching"
    );
    let results = matcher.match_all(&queries);
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn run_inspect(path: &Path) -> Result<()> {
    let (gallery, total) = load_gallery(path)?;
    println!("subjects:  {}", gallery.len());
    match gallery.dim() {
        Some(dim) => println!("dimension: {dim}"),
        None => println!("dimension: n/a"),
    }
    println!("skipped:   {}", total - gallery.len());
    for entry in gallery.entries() {
        println!("  {}", entry.label);
    }
    Ok(())
}

fn run_score(config: &Config, distance: f32) -> Result<()> {
    if !distance.is_finite() || distance < 0.0 {
        anyhow::bail!("distance must be a finite, non-negative number");
    }
    matcher::validate_threshold(config.threshold)?;
    println!(
        "{:.2}",
        config.strategy.score(distance, config.threshold)
    );
    Ok(())
}
