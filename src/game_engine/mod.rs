//! Core game engine — problem generation, round lifecycle, and history views.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | All shared types: problems, tiers, round state, summaries, history |
//! | `operators` | Per-operator operand rules and the per-tier magnitude caps |
//! | `generator` | `generate()` — picks an operator and dispatches to its rule |
//! | `scheduler` | Virtual-clock timers: the countdown ticker and the answer pause |
//! | `engine`    | `RoundEngine` — the round state machine |
//! | `stats`     | Chart series and aggregate numbers over past rounds |

pub mod engine;
pub mod generator;
pub mod models;
pub mod operators;
pub mod scheduler;
pub mod stats;

// Re-export the public API surface so callers can use
// `game_engine::RoundEngine` without reaching into sub-modules.
pub use engine::RoundEngine;
pub use generator::{generate, generate_problem, ProblemRequest};
pub use models::{
    accuracy_percent, DifficultyTier, Feedback, Operator, Phase, Problem, RoundHistory,
    RoundSnapshot, RoundState, RoundSummary,
};
pub use stats::{ChartSeries, HistoryStats};
