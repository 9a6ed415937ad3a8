use nback_core::{GameConfiguration, GameType, TrialOutcome, TrialResult};
use nback_timing::RunId;
use serde::{Deserialize, Serialize};

/// End-of-game report: score, highscore change, and the trial breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub run: u64,
    pub game_type: GameType,
    pub n_back: u32,
    pub interval_seconds: u32,
    pub score: i32,
    pub previous_highscore: i32,
    pub new_highscore: bool,
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    pub correct_rejections: usize,
    pub mean_reaction_ms: Option<f64>,
    pub trials: Vec<TrialResult>,
}

impl GameSummary {
    pub fn new(
        run: RunId,
        game_type: GameType,
        config: &GameConfiguration,
        trials: Vec<TrialResult>,
        score: i32,
        previous_highscore: i32,
    ) -> Self {
        let count = |outcome| trials.iter().filter(|t| t.outcome == outcome).count();
        let times: Vec<f64> = trials
            .iter()
            .filter_map(|t| t.reaction_time_ns)
            .map(|ns| ns as f64 / 1_000_000.0)
            .collect();
        let mean_reaction_ms = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<f64>() / times.len() as f64)
        };

        Self {
            run: run.get(),
            game_type,
            n_back: config.n_back,
            interval_seconds: config.interval_seconds,
            score,
            previous_highscore,
            new_highscore: score > previous_highscore,
            hits: count(TrialOutcome::Hit),
            misses: count(TrialOutcome::Miss),
            false_alarms: count(TrialOutcome::FalseAlarm),
            correct_rejections: count(TrialOutcome::CorrectRejection),
            mean_reaction_ms,
            trials,
        }
    }

    /// Correct decisions over all comparable steps.
    pub fn accuracy(&self) -> Option<f64> {
        let judged = self.hits + self.misses + self.false_alarms + self.correct_rejections;
        if judged == 0 {
            return None;
        }
        Some((self.hits + self.correct_rejections) as f64 / judged as f64)
    }
}
