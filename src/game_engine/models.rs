use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Problem primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Glyph shown between the operands.
    pub fn glyph(self) -> &'static str {
        match self {
            Operator::Add      => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide   => "÷",
        }
    }

    /// Evaluate `lhs op rhs`. Division is exact for generated problems;
    /// `None` when the divisor is zero or the result would not be whole.
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Operator::Add      => lhs.checked_add(rhs),
            Operator::Subtract => lhs.checked_sub(rhs),
            Operator::Multiply => lhs.checked_mul(rhs),
            Operator::Divide   => {
                if rhs == 0 || lhs % rhs != 0 {
                    None
                } else {
                    Some(lhs / rhs)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// One generated arithmetic problem. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Infix text, e.g. `"12 ÷ 3"`.
    pub question: String,
    pub answer: i64,
    pub operator: Operator,
    pub lhs: i64,
    pub rhs: i64,
}

impl Problem {
    pub fn new(operator: Operator, lhs: i64, rhs: i64, answer: i64) -> Self {
        Problem {
            question: format!("{} {} {}", lhs, operator.glyph(), rhs),
            answer,
            operator,
            lhs,
            rhs,
        }
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

pub const MEDIUM_THRESHOLD: u32 = 5;
pub const HARD_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    /// Tier for a score using the standard 5 / 10 thresholds.
    pub fn for_score(score: u32) -> Self {
        Self::for_score_with(score, MEDIUM_THRESHOLD, HARD_THRESHOLD)
    }

    pub fn for_score_with(score: u32, medium: u32, hard: u32) -> Self {
        if score >= hard {
            DifficultyTier::Hard
        } else if score >= medium {
            DifficultyTier::Medium
        } else {
            DifficultyTier::Easy
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyTier::Easy   => write!(f, "Easy"),
            DifficultyTier::Medium => write!(f, "Medium"),
            DifficultyTier::Hard   => write!(f, "Hard"),
        }
    }
}

// ---------------------------------------------------------------------------
// Round state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: Phase,
    pub score: u32,
    pub incorrect_count: u32,
    pub time_remaining: u32,
    pub current_problem: Option<Problem>,
    pub feedback: Feedback,
}

impl RoundState {
    pub fn idle(round_secs: u32) -> Self {
        RoundState {
            phase: Phase::Idle,
            score: 0,
            incorrect_count: 0,
            time_remaining: round_secs,
            current_problem: None,
            feedback: Feedback::None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.score + self.incorrect_count
    }
}

/// `round(correct / attempts * 100)`, or 0 when nothing was attempted.
pub fn accuracy_percent(score: u32, incorrect: u32) -> u8 {
    let attempts = score as u64 + incorrect as u64;
    if attempts == 0 {
        return 0;
    }
    (score as f64 / attempts as f64 * 100.0).round() as u8
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Frozen result of one completed round.
///
/// Serialized with camelCase keys and `completedAt` in epoch milliseconds.
/// The aliases read records written with the older key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub score: u32,
    #[serde(alias = "incorrectAnswers")]
    pub incorrect_count: u32,
    #[serde(alias = "accuracy")]
    pub accuracy_percent: u8,
    #[serde(alias = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub completed_at: DateTime<Utc>,
}

impl RoundSummary {
    pub fn new(score: u32, incorrect_count: u32, completed_at: DateTime<Utc>) -> Self {
        RoundSummary {
            score,
            incorrect_count,
            accuracy_percent: accuracy_percent(score, incorrect_count),
            completed_at,
        }
    }
}

/// Completed rounds in chronological (insertion) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundHistory {
    rounds: Vec<RoundSummary>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, summary: RoundSummary) {
        self.rounds.push(summary);
    }

    pub fn rounds(&self) -> &[RoundSummary] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn latest(&self) -> Option<&RoundSummary> {
        self.rounds.last()
    }

    /// Best score across all rounds, 0 for an empty history.
    pub fn high_score(&self) -> u32 {
        self.rounds.iter().map(|r| r.score).max().unwrap_or(0)
    }
}

impl From<Vec<RoundSummary>> for RoundHistory {
    fn from(rounds: Vec<RoundSummary>) -> Self {
        RoundHistory { rounds }
    }
}

// ---------------------------------------------------------------------------
// Presentation snapshot
// ---------------------------------------------------------------------------

/// Read-only view handed to whatever renders the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: Phase,
    pub score: u32,
    pub incorrect_count: u32,
    pub time_remaining: u32,
    pub question: Option<String>,
    pub feedback: Feedback,
    pub pending_input: String,
    pub tier: DifficultyTier,
    pub high_score: u32,
    pub accepts_input: bool,
}
