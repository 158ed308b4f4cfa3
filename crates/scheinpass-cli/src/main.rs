//! Command-line entry point for scheinpass.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "scheinpass", version, about = "Schein eligibility summaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a cohort summary over a course file
    Summarize {
        /// Path to the course .toml file
        #[arg(long)]
        course: PathBuf,

        /// Max students evaluated concurrently
        #[arg(long, default_value = "4")]
        parallelism: usize,

        /// Directory for persisted output
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: table, json, markdown (comma-separated)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Validate a course file without evaluating anything
    Validate {
        /// Path to the course .toml file
        #[arg(long)]
        course: PathBuf,
    },

    /// Create a commented starter course file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scheinpass=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summarize {
            course,
            parallelism,
            output,
            format,
        } => commands::summarize::execute(course, parallelism, output, format).await,
        Commands::Validate { course } => commands::validate::execute(course),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
