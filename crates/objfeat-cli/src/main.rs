#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
//! `objfeat` CLI - inspect memory-mapped object feature datasets
//!
//! Usage:
//!   `objfeat info ./preprocessed_data --split train --max-obj 10`
//!   `objfeat variants ./preprocessed_data --split valid`
//!   `objfeat get 42 ./preprocessed_data --values 4`
//!   `objfeat warmup ./preprocessed_data`

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use objfeat_core::ObjfeatConfig;

#[derive(Parser)]
#[command(name = "objfeat")]
#[command(author, version, about = "Memory-mapped object feature datasets")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true, env = "OBJFEAT_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Dataset selection shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct DatasetArgs {
    /// Dataset directory (defaults to `dataset.data_dir`)
    pub(crate) dir: Option<PathBuf>,

    /// Split name
    #[arg(short, long)]
    pub(crate) split: Option<String>,

    /// Object slots per record
    #[arg(short, long)]
    pub(crate) max_obj: Option<usize>,

    /// Floats per object slot
    #[arg(long)]
    pub(crate) dim: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show records, documents and the selected truncation variant
    Info {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// List truncation variants present on disk
    Variants {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Print one record as JSON
    Get {
        /// Global record index
        index: u64,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// Leading values printed per real object
        #[arg(long, default_value = "4")]
        values: usize,
    },

    /// Read the selected variant once to populate the page cache
    Warmup {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ObjfeatConfig::load_from_path(path)?,
        None => ObjfeatConfig::load()?,
    };

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Info { dataset } => {
            commands::info(&commands::resolve(&config, &dataset)?, &mut out)?;
        }
        Commands::Variants { dataset } => {
            commands::variants(&commands::resolve(&config, &dataset)?, &mut out)?;
        }
        Commands::Get {
            index,
            dataset,
            values,
        } => {
            commands::get(&commands::resolve(&config, &dataset)?, index, values, &mut out)?;
        }
        Commands::Warmup { dataset } => {
            commands::warmup(&commands::resolve(&config, &dataset)?, &mut out)?;
        }
    }

    Ok(())
}
