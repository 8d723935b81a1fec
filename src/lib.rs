//! # math_sprint
//!
//! Engine for a timed arithmetic practice game.
//!
//! The player answers randomly generated problems before a 30-tick countdown
//! runs out. Problems get harder as the score climbs, and every finished
//! round is appended to a persisted history that feeds a statistics view.
//!
//! ## How it works
//!
//! 1. Build a [`RoundEngine`] with a [`GameConfig`], a random source, and a
//!    [`HistoryStore`]. The engine loads past rounds once, up front.
//! 2. Call [`RoundEngine::start`], then drive time with
//!    [`RoundEngine::advance_time`]. The engine owns its countdown ticker and
//!    the short pause after each answer; nothing runs on another thread.
//! 3. Feed answers with [`RoundEngine::set_pending_input`] and
//!    [`RoundEngine::submit`], and render [`RoundEngine::snapshot`].
//! 4. When time runs out the round is summarised, appended to history, and
//!    saved. A failed save is logged and play carries on.
//!
//! ## Difficulty
//!
//! | Score  | Tier   | add/sub | mult | div |
//! |--------|--------|---------|------|-----|
//! | 0–4    | Easy   | 10      | 10   | 10  |
//! | 5–9    | Medium | 50      | 20   | 50  |
//! | 10+    | Hard   | 100     | 30   | 100 |
//!
//! ## Quick start
//!
//! ```rust
//! use math_sprint::{GameConfig, MemoryStore, Phase, RoundEngine};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let store = MemoryStore::new(math_sprint::HISTORY_KEY);
//! let mut engine = RoundEngine::new(GameConfig::default(), StdRng::seed_from_u64(7), store);
//!
//! engine.start();
//! let answer = engine.current_problem().unwrap().answer;
//! engine.set_pending_input(&answer.to_string());
//! engine.submit();
//! assert_eq!(engine.score(), 1);
//!
//! engine.advance_time(30_000);
//! assert_eq!(engine.phase(), Phase::Finished);
//! assert_eq!(engine.high_score(), 1);
//! ```

pub mod config;
pub mod error;
pub mod game_engine;
pub mod storage;

pub use config::{GameConfig, HISTORY_KEY};
pub use error::StoreError;
pub use game_engine::{
    accuracy_percent, generate, generate_problem, ChartSeries, DifficultyTier, Feedback,
    HistoryStats, Operator, Phase, Problem, ProblemRequest, RoundEngine, RoundHistory,
    RoundSnapshot, RoundState, RoundSummary,
};
pub use storage::{HistoryStore, JsonFileStore, MemoryStore};
