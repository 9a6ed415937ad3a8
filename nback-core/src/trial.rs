use serde::{Deserialize, Serialize};

use crate::stimulus::Stimulus;

/// Signal detection outcome of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    Hit,
    Miss,
    FalseAlarm,
    CorrectRejection,
    /// Index below N, nothing to compare against.
    NotEligible,
}

impl TrialOutcome {
    pub fn classify(eligible: bool, is_target: bool, responded: bool) -> Self {
        match (eligible, is_target, responded) {
            (false, _, _) => TrialOutcome::NotEligible,
            (true, true, true) => TrialOutcome::Hit,
            (true, true, false) => TrialOutcome::Miss,
            (true, false, true) => TrialOutcome::FalseAlarm,
            (true, false, false) => TrialOutcome::CorrectRejection,
        }
    }
}

/// Recorded result per presented step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub index: usize,
    pub stimulus: Stimulus,
    pub is_target: bool,
    pub responded: bool,
    pub outcome: TrialOutcome,
    pub reaction_time_ns: Option<u64>,
    pub onset_ns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_signal_detection_grid() {
        assert_eq!(TrialOutcome::classify(true, true, true), TrialOutcome::Hit);
        assert_eq!(TrialOutcome::classify(true, true, false), TrialOutcome::Miss);
        assert_eq!(TrialOutcome::classify(true, false, true), TrialOutcome::FalseAlarm);
        assert_eq!(
            TrialOutcome::classify(true, false, false),
            TrialOutcome::CorrectRejection
        );
        assert_eq!(TrialOutcome::classify(false, true, true), TrialOutcome::NotEligible);
    }

    #[test]
    fn result_serializes_outcome_in_snake_case() {
        let result = TrialResult {
            index: 3,
            stimulus: Stimulus::new(4, 9).unwrap(),
            is_target: false,
            responded: true,
            outcome: TrialOutcome::FalseAlarm,
            reaction_time_ns: Some(420_000_000),
            onset_ns: 6_000_000_000,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"outcome\":\"false_alarm\""));
        assert!(json.contains("\"stimulus\":4"));
    }
}
