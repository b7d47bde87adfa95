//! skein CLI — simulation, benchmarking, and debugging.

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "skein")]
#[command(version, about = "skein — implicit mass-spring cloth and hair solver")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "skein_solver=debug").
    #[arg(short, long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

/// Benchmark report format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a scene file.
    Simulate {
        /// Path to the scene description (TOML).
        #[arg(short, long, default_value = "scene.toml")]
        scene: String,

        /// Directory to write per-frame state snapshots into.
        #[arg(short, long)]
        output: Option<String>,

        /// Write a snapshot every N frames.
        #[arg(long, default_value_t = 1)]
        every: u32,
    },

    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (hanging_cloth, sphere_drape, hair_drape, wind_cloth, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Override the number of frames per scenario.
        #[arg(short, long)]
        frames: Option<u32>,

        /// Output file path. Prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<String>,

        #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,
    },

    /// Inspect a state snapshot file.
    Inspect {
        /// Path to snapshot file.
        path: String,
    },

    /// Validate a scene (.toml) or body (.json) file.
    Validate {
        /// Path to scene or body file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Simulate { scene, output, every } => commands::simulate(&scene, output.as_deref(), every),
        Commands::Benchmark {
            scenario,
            frames,
            output,
            format,
        } => commands::benchmark(&scenario, frames, output.as_deref(), format),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
