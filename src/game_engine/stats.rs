//! Statistics view over the round history.

use serde::{Deserialize, Serialize};

use crate::game_engine::models::{RoundHistory, RoundSummary};

/// Per-round series for a "performance over time" chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// `"Round 1"`, `"Round 2"`, ...
    pub labels: Vec<String>,
    pub scores: Vec<u32>,
    /// 0..=100 per round.
    pub accuracy: Vec<u8>,
}

impl ChartSeries {
    pub fn from_history(history: &RoundHistory) -> Self {
        let rounds = history.rounds();
        ChartSeries {
            labels: (1..=rounds.len()).map(|i| format!("Round {i}")).collect(),
            scores: rounds.iter().map(|r| r.score).collect(),
            accuracy: rounds.iter().map(|r| r.accuracy_percent).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub rounds_played: usize,
    pub best_score: u32,
    pub total_correct: u64,
    pub total_incorrect: u64,
    /// Rounded mean of per-round accuracy; 0 with no rounds.
    pub mean_accuracy: u8,
    pub latest: Option<RoundSummary>,
}

impl HistoryStats {
    pub fn from_history(history: &RoundHistory) -> Self {
        let rounds = history.rounds();
        if rounds.is_empty() {
            return Self::default();
        }
        let accuracy_sum: u64 = rounds.iter().map(|r| r.accuracy_percent as u64).sum();
        HistoryStats {
            rounds_played: rounds.len(),
            best_score: history.high_score(),
            total_correct: rounds.iter().map(|r| r.score as u64).sum(),
            total_incorrect: rounds.iter().map(|r| r.incorrect_count as u64).sum(),
            mean_accuracy: (accuracy_sum as f64 / rounds.len() as f64).round() as u8,
            latest: history.latest().cloned(),
        }
    }
}
