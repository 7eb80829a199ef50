//! parcelgen - Parcelable boilerplate generator
//!
//! Loads a JSON class description, installs the generated serialization
//! members on one class and prints the resulting source.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod generate;

/// parcelgen - Parcelable boilerplate generator
#[derive(Parser, Debug)]
#[command(name = "parcelgen")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "PARCELGEN_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate serialization members for a class and print its source
    Generate {
        /// JSON model of the compilation unit
        model: PathBuf,

        /// Target class, simple or fully qualified name
        #[arg(short, long)]
        class: String,

        /// Fields to serialize, in order (default: every instance field)
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,

        /// Generator configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Generate {
            model,
            class,
            fields,
            config,
        } => {
            let source = generate::run(&model, &class, &fields, config.as_deref())?;
            print!("{source}");
            Ok(())
        }
    }
}
