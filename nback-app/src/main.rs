mod app;
mod command;
mod render;

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use app::{App, AppOptions};

/// Terminal N-back trainer.
#[derive(Parser, Debug)]
#[command(name = "nback", version, about)]
struct Args {
    /// Settings file, defaults to the platform data directory
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Seed for reproducible sequences
    #[arg(long)]
    seed: Option<u64>,

    /// visual, audio, av or none
    #[arg(long, default_value = "visual", value_parser = command::parse_game_type)]
    game_type: nback_core::GameType,

    /// Write each finished game's summary here as JSON
    #[arg(long)]
    results: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose.tracing_level_filter());

    let app = App::new(AppOptions {
        settings_path: args.settings,
        seed: args.seed,
        game_type: args.game_type,
        results: args.results,
    })?;
    app.run().await
}

/// Logs go to stderr so they do not interleave with the game display.
/// `RUST_LOG` takes precedence over `-v` / `-q`.
fn init_tracing(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
