use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generator::Sequence;

/// Score change caused by one match signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDelta {
    Ignored,
    Gain,
    Penalty,
}

impl ScoreDelta {
    pub fn value(&self) -> i32 {
        match self {
            ScoreDelta::Ignored => 0,
            ScoreDelta::Gain => 1,
            ScoreDelta::Penalty => -1,
        }
    }
}

/// Judges "match" signals, at most one per sequence index.
#[derive(Debug, Clone)]
pub struct MatchEvaluator {
    n_back: usize,
    answered: Option<usize>,
}

impl MatchEvaluator {
    pub fn new(n_back: u32) -> Self {
        Self {
            n_back: n_back as usize,
            answered: None,
        }
    }

    pub fn n_back(&self) -> usize {
        self.n_back
    }

    /// The answered mark is keyed by index, so it lapses as soon as the
    /// clock moves on.
    pub fn is_answered(&self, index: usize) -> bool {
        self.answered == Some(index)
    }

    pub fn on_match_signal(&mut self, current_index: Option<usize>, sequence: &Sequence) -> ScoreDelta {
        let Some(index) = current_index else {
            return ScoreDelta::Ignored;
        };
        if index < self.n_back || index >= sequence.len() {
            debug!(index, n_back = self.n_back, "match signal before first comparable stimulus");
            return ScoreDelta::Ignored;
        }
        if self.is_answered(index) {
            debug!(index, "match signal already registered");
            return ScoreDelta::Ignored;
        }
        self.answered = Some(index);
        if sequence.is_match(index, self.n_back) {
            ScoreDelta::Gain
        } else {
            ScoreDelta::Penalty
        }
    }
}
