use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use nback_core::GameType;
use nback_game::{GameEvent, GameOptions, GameStateMachine, GameSummary, ScoreDelta};
use nback_settings::{JsonFileBackend, SettingsStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::command::{Command, HELP};
use crate::render::{render_cue, status_line, summary_report};

pub struct AppOptions {
    pub settings_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub game_type: GameType,
    pub results: Option<PathBuf>,
}

pub struct App {
    game: GameStateMachine,
    results: Option<PathBuf>,
}

/// `<data dir>/nback/settings.json`, when the platform has a data dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("nback").join("settings.json"))
}

impl App {
    pub fn new(options: AppOptions) -> Result<Self> {
        let path = options.settings_path.or_else(default_settings_path);
        let settings = match path {
            Some(path) => {
                info!(path = %path.display(), "loading settings");
                SettingsStore::open(JsonFileBackend::new(&path))
                    .with_context(|| format!("failed to open settings at {}", path.display()))?
            }
            None => {
                warn!("no data directory, settings will not be saved");
                SettingsStore::in_memory()
            }
        };

        let game = GameStateMachine::new(
            Arc::new(settings),
            GameOptions {
                seed: options.seed,
                game_type: options.game_type,
                ..GameOptions::default()
            },
        );

        Ok(Self {
            game,
            results: options.results,
        })
    }

    pub async fn run(self) -> Result<()> {
        println!("=== N-BACK ===");
        println!("{}", status_line(&self.game.snapshot()));
        println!("Type `start` to play, `help` for commands.\n");

        let mut events = self.game.events();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read stdin")? else {
                        break;
                    };
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                event = events.recv() => match event {
                    Ok(event) => self.on_event(event),
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "display fell behind"),
                    Err(RecvError::Closed) => break,
                },
            }
        }

        if let Some(run) = self.game.cancel() {
            debug!(%run, "cancelled on exit");
        }
        Ok(())
    }

    /// Returns false once the user asks to quit.
    fn handle_line(&self, line: &str) -> bool {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(err) => {
                println!("{err}");
                return true;
            }
        };

        let outcome = match command {
            Command::Start => self.game.start().map(|_| ()),
            Command::Match => {
                self.report_match(self.game.submit_match());
                Ok(())
            }
            Command::SetGameType(game_type) => self.game.set_game_type(game_type),
            Command::SetNBack(n) => self.game.set_n_back(n),
            Command::SetInterval(seconds) => self.game.set_interval_seconds(seconds),
            Command::SetEvents(count) => self.game.set_event_count(count),
            Command::Status => {
                println!("{}", status_line(&self.game.snapshot()));
                Ok(())
            }
            Command::Cancel => {
                if self.game.cancel().is_none() {
                    println!("no game is running");
                }
                Ok(())
            }
            Command::Help => {
                println!("{HELP}");
                Ok(())
            }
            Command::Quit => return false,
        };

        match outcome {
            Ok(()) => {
                if matches!(
                    command,
                    Command::SetGameType(_)
                        | Command::SetNBack(_)
                        | Command::SetInterval(_)
                        | Command::SetEvents(_)
                ) {
                    println!("{}", status_line(&self.game.snapshot()));
                }
            }
            Err(err) => println!("{err}"),
        }
        true
    }

    fn report_match(&self, delta: ScoreDelta) {
        match delta {
            ScoreDelta::Ignored => {}
            ScoreDelta::Gain => println!("  +1"),
            ScoreDelta::Penalty => println!("  -1 wrong"),
        }
    }

    fn on_event(&self, event: GameEvent) {
        match event {
            GameEvent::Started { len, game_type, .. } => {
                let n = self.game.config().n_back;
                println!("\n{game_type:?} game, {len} stimuli, {n}-back. Type `m` on a match.");
            }
            GameEvent::Stimulus { index, cue, .. } => {
                let grid_size = self.game.config().grid_size;
                println!("\n#{}\n{}", index + 1, render_cue(cue, grid_size));
            }
            GameEvent::Gap { .. } | GameEvent::Response { .. } => {}
            GameEvent::Finished { summary, .. } => {
                println!("\n{}", summary_report(&summary));
                if let Some(path) = &self.results {
                    match write_results(path, &summary) {
                        Ok(()) => println!("Results saved to {}", path.display()),
                        Err(e) => warn!("results not saved: {:#}", e),
                    }
                }
                println!("{}", status_line(&self.game.snapshot()));
            }
            GameEvent::Cancelled { .. } => println!("game cancelled"),
        }
    }
}

fn write_results(path: &Path, summary: &GameSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create results file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}
