use nback_core::{GameConfiguration, Stimulus, TrialOutcome, TrialResult};
use nback_timing::RunId;

use crate::evaluator::{MatchEvaluator, ScoreDelta};
use crate::generator::Sequence;

/// Per-step bookkeeping, filled in as the clock presents each index.
#[derive(Debug, Clone, Default)]
struct StepLog {
    onset_ns: Option<u64>,
    reaction_ns: Option<u64>,
}

/// Everything that belongs to one run: the configuration it was started
/// with, the sequence, the clock's position, and the responses so far.
#[derive(Debug, Clone)]
pub struct GameSession {
    run: RunId,
    config: GameConfiguration,
    sequence: Sequence,
    current_index: Option<usize>,
    evaluator: MatchEvaluator,
    steps: Vec<StepLog>,
}

impl GameSession {
    pub fn new(run: RunId, sequence: Sequence, config: GameConfiguration) -> Self {
        let steps = vec![StepLog::default(); sequence.len()];
        Self {
            run,
            config,
            sequence,
            current_index: None,
            evaluator: MatchEvaluator::new(config.n_back),
            steps,
        }
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    /// Settings changed mid-run do not reach this copy.
    pub fn config(&self) -> &GameConfiguration {
        &self.config
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Moves to `index` and returns the stimulus to show.
    pub fn present(&mut self, index: usize, now_ns: u64) -> Option<Stimulus> {
        let stimulus = self.sequence.get(index)?;
        self.current_index = Some(index);
        self.steps[index].onset_ns = Some(now_ns);
        Some(stimulus)
    }

    /// Runs the evaluator against the current index and records the
    /// reaction time of any scored response.
    pub fn match_signal(&mut self, now_ns: u64) -> ScoreDelta {
        let delta = self
            .evaluator
            .on_match_signal(self.current_index, &self.sequence);
        if delta != ScoreDelta::Ignored {
            if let Some(index) = self.current_index {
                let step = &mut self.steps[index];
                step.reaction_ns = Some(now_ns.saturating_sub(step.onset_ns.unwrap_or(now_ns)));
            }
        }
        delta
    }

    /// Results for every index presented so far.
    pub fn results(&self) -> Vec<TrialResult> {
        let n = self.evaluator.n_back();
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(index, step)| {
                let onset_ns = step.onset_ns?;
                let stimulus = self.sequence.get(index)?;
                let is_target = self.sequence.is_match(index, n);
                let responded = step.reaction_ns.is_some();
                Some(TrialResult {
                    index,
                    stimulus,
                    is_target,
                    responded,
                    outcome: TrialOutcome::classify(index >= n, is_target, responded),
                    reaction_time_ns: step.reaction_ns,
                    onset_ns,
                })
            })
            .collect()
    }
}
