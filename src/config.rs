//! Game tuning.
//!
//! Every field has a serde default, so a partial document only overrides
//! what it names:
//!
//! ```
//! use math_sprint::GameConfig;
//!
//! let cfg = GameConfig::from_json(r#"{ "round_secs": 60 }"#);
//! assert_eq!(cfg.round_secs, 60);
//! assert_eq!(cfg.feedback_delay_ms, 400);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::game_engine::models::{DifficultyTier, HARD_THRESHOLD, MEDIUM_THRESHOLD};

/// Key the round history is stored under.
pub const HISTORY_KEY: &str = "mathTrainerPastRounds";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Countdown length in ticks.
    #[serde(default = "default_round_secs")]
    pub round_secs: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Pause between an answer and the next problem.
    #[serde(default = "default_feedback_delay_ms")]
    pub feedback_delay_ms: u64,
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: u32,
    #[serde(default = "default_hard_threshold")]
    pub hard_threshold: u32,
}

fn default_round_secs() -> u32 {
    30
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_feedback_delay_ms() -> u64 {
    400
}
fn default_medium_threshold() -> u32 {
    MEDIUM_THRESHOLD
}
fn default_hard_threshold() -> u32 {
    HARD_THRESHOLD
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_secs: default_round_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            feedback_delay_ms: default_feedback_delay_ms(),
            medium_threshold: default_medium_threshold(),
            hard_threshold: default_hard_threshold(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON document; an unreadable document yields the defaults.
    /// The result is always [`validated`](Self::validated).
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<GameConfig>(text) {
            Ok(cfg) => cfg.validated(),
            Err(e) => {
                warn!(error = %e, "invalid game config, using defaults");
                Self::default()
            }
        }
    }

    /// Round length is at least one tick, and the medium threshold never
    /// sits above the hard one.
    pub fn validated(mut self) -> Self {
        if self.round_secs == 0 {
            warn!("round_secs must be at least 1, using 1");
            self.round_secs = 1;
        }
        if self.medium_threshold > self.hard_threshold {
            warn!(
                medium = self.medium_threshold,
                hard = self.hard_threshold,
                "medium_threshold above hard_threshold, swapping"
            );
            std::mem::swap(&mut self.medium_threshold, &mut self.hard_threshold);
        }
        self
    }

    pub fn tier_for(&self, score: u32) -> DifficultyTier {
        DifficultyTier::for_score_with(score, self.medium_threshold, self.hard_threshold)
    }
}
