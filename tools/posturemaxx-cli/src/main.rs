//! PostureMaxx CLI: drive the posture pipeline from the command line.
//!
//! Usage:
//!   posturemaxx replay <PATH>       Run the pipeline over a recorded pose stream
//!   posturemaxx angle --neck --ear  Compute and classify a single neck angle
//!   posturemaxx validate <PATH>     Check that a pose stream parses
//!   posturemaxx config              Show or initialize the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use posturemaxx_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "posturemaxx",
    about = "Slouch detection from 2D body-pose estimates",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the posture pipeline over a recorded pose stream
    Replay {
        /// Path to the pose stream (JSONL)
        path: PathBuf,

        /// Write session events to this JSONL file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum interval between processed frames (milliseconds)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Use the fast 100ms gate interval
        #[arg(long, conflicts_with = "interval_ms")]
        fast: bool,

        /// Classify smoothed joints instead of the raw frame
        #[arg(long)]
        smoothed: bool,

        /// Slouch thresholds: latest|single-cutoff
        #[arg(long)]
        thresholds: Option<String>,

        /// Pace frames by their recorded timestamps
        #[arg(long)]
        realtime: bool,

        /// Print every processed update, not only status changes
        #[arg(long)]
        all: bool,
    },

    /// Compute the neck angle for a neck and ear position
    Angle {
        /// Neck location as X,Y
        #[arg(long, value_parser = commands::angle::parse_point)]
        neck: (f64, f64),

        /// Ear location as X,Y
        #[arg(long, value_parser = commands::angle::parse_point)]
        ear: (f64, f64),

        /// Slouch thresholds: latest|single-cutoff
        #[arg(long)]
        thresholds: Option<String>,
    },

    /// Validate a pose stream
    Validate {
        /// Path to the pose stream (JSONL)
        path: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing config file when initializing
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    posturemaxx_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Replay {
            path,
            output,
            interval_ms,
            fast,
            smoothed,
            thresholds,
            realtime,
            all,
        } => {
            let overrides = commands::replay::Overrides {
                interval_ms,
                fast,
                smoothed,
                thresholds,
            };
            commands::replay::run(&config, path, output, overrides, realtime, all).await
        }
        Commands::Angle {
            neck,
            ear,
            thresholds,
        } => commands::angle::run(&config, neck, ear, thresholds),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Config { init, force } => commands::config::run(&config, cli.config, init, force),
    }
}
