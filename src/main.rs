// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use sandbox_camera::OutputMode;
use sandbox_camera::constants::markers::PRINTABLE_MARKER_COUNT;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "sandbox-camera")]
#[command(about = "Depth filtering and marker cropping for AR sandboxes")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Overlay,
    Crop,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Overlay => OutputMode::Overlay,
            ModeArg::Crop => OutputMode::Crop,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write printable marker images for the sandbox corners
    Markers {
        /// Number of markers, ids start at 1
        #[arg(short, long, default_value_t = PRINTABLE_MARKER_COUNT)]
        count: u32,

        /// Marker side length in pixels (default: from config)
        #[arg(short, long)]
        size: Option<u32>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the filter pipeline over recorded color/depth frames
    Process {
        /// Directory of color frames
        #[arg(long)]
        color: PathBuf,

        /// Directory of colorized depth frames
        #[arg(long)]
        depth: PathBuf,

        /// Output directory (default: ./sandbox-camera_TIMESTAMP)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (default: user config dir, else built-in defaults)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured output mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// Print the default configuration as JSON
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=sandbox_camera=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Markers {
            count,
            size,
            output,
        } => cli::write_markers(count, size, output),
        Commands::Process {
            color,
            depth,
            output,
            config,
            mode,
        } => cli::process(&color, &depth, output, config, mode.map(Into::into)),
        Commands::Config => cli::print_default_config(),
    }
}
