//! `gwv`: validate a GlyphWiki dump and write the findings as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gwv_core::{to_json, Dump, Engine, ReferenceData, ValidatorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reference tables shipped with the sources.
const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");

const DEFAULT_OUTPUT: &str = "gwv_result.json";

#[derive(Parser)]
#[command(name = "gwv", about = "GlyphWiki data validator")]
struct Args {
    /// dump file (`dump_newest_only.txt` or a `.csv` snapshot)
    dumpfile: PathBuf,

    /// output JSON (default: gwv_result.json next to the dump)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// validators to run (default: all)
    #[arg(short, long, num_args = 1..)]
    names: Vec<String>,

    /// abort on the first rule failure
    #[arg(long)]
    strict: bool,

    /// directory holding the reference tables
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// TOML run configuration; command-line options take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<ValidatorConfig> {
    let mut config = match &args.config {
        Some(path) => ValidatorConfig::load_toml(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    if !args.names.is_empty() {
        config.validators = args.names.clone();
    }
    config.strict |= args.strict;
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

fn output_path(args: &Args) -> PathBuf {
    args.out.clone().unwrap_or_else(|| {
        args.dumpfile
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(DEFAULT_OUTPUT)
    })
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = load_config(&args)?;

    let data_dir = config
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(BUNDLED_DATA_DIR));
    let data = ReferenceData::load(&data_dir)
        .with_context(|| format!("loading reference tables from {}", data_dir.display()))?;

    let validators = gwv_validators::build_selected(&config.validators, &data)?;

    info!(dump = %args.dumpfile.display(), "loading dump");
    let dump = Dump::open(&args.dumpfile)
        .with_context(|| format!("loading dump {}", args.dumpfile.display()))?;

    let output = Engine::new(validators)
        .strict(config.strict)
        .category_cache_size(config.category_cache_size)
        .run(&dump)?;

    let out = output_path(&args);
    let json = to_json(&output).context("serializing results")?;
    std::fs::write(&out, json).with_context(|| format!("writing {}", out.display()))?;
    info!(out = %out.display(), "wrote results");
    Ok(())
}
