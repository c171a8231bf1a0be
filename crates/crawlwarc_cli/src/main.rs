//! crawlwarc CLI
//!
//! Command-line tools for writing and reading crawl archives.
//!
//! # Commands
//!
//! - `archive` - Write JSON-lines exchanges into rotating `.warc.gz` files
//! - `inspect` - List the records of a `.warc.gz` file
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// crawlwarc archive tools.
#[derive(Parser)]
#[command(name = "crawlwarc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write exchanges from a JSON-lines file into WARC files
    Archive {
        /// JSON settings file; must name warc_dest
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// JSON-lines file with one exchange per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (overrides warc_dest)
        #[arg(short, long, required_unless_present = "settings")]
        dest: Option<PathBuf>,

        /// File name prefix (overrides warc_prefix)
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// List the records of an archive file
    Inspect {
        /// Archive file to read
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Archive {
            settings,
            input,
            dest,
            prefix,
        } => {
            commands::archive::run(settings.as_deref(), &input, dest, prefix)?;
        }
        Commands::Inspect { file, format } => {
            commands::inspect::run(&file, &format)?;
        }
        Commands::Version => {
            println!("crawlwarc CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("crawlwarc core v{}", crawlwarc_core::VERSION);
        }
    }

    Ok(())
}
