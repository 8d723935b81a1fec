//! Plays one simulated round end to end.
//!
//! Run with: `cargo run --example round`
//!
//! A scripted player answers every problem, getting roughly one in four
//! wrong, while the virtual clock moves forward 1.5 seconds per answer.
//! History is written to a temp directory, then reloaded to print the
//! statistics view.
//!
//! Set `RUST_LOG=math_sprint=debug` to see the engine's tracing output.

use math_sprint::{
    ChartSeries, Feedback, GameConfig, HistoryStats, HistoryStore, JsonFileStore, Phase,
    RoundEngine, HISTORY_KEY,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let config = GameConfig::default();
    let store = JsonFileStore::new(dir.path(), HISTORY_KEY);
    let mut engine = RoundEngine::new(config, StdRng::seed_from_u64(42), store);
    let mut player = StdRng::seed_from_u64(7);

    engine.start();
    while engine.phase() == Phase::Playing {
        let Some(problem) = engine.current_problem().cloned() else { break };
        let guess = if player.gen_bool(0.75) { problem.answer } else { problem.answer + 1 };

        engine.set_pending_input(&guess.to_string());
        let mark = match engine.submit() {
            Some(Feedback::Correct)   => "✓",
            Some(Feedback::Incorrect) => "✗",
            _                         => "?",
        };
        println!(
            "[{:>2}s  {:<6}]  {} = {:<5} {}",
            engine.time_remaining(),
            engine.tier().to_string(),
            problem.question,
            guess,
            mark
        );
        engine.advance_time(1_500);
    }

    if let Some(summary) = engine.last_summary() {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("  Time's up!");
        println!("  Final score: {}", summary.score);
        println!("  Incorrect:   {}", summary.incorrect_count);
        println!("  Accuracy:    {}%", summary.accuracy_percent);
        if engine.is_new_high_score() {
            println!("  New high score!");
        }
    }

    let history = JsonFileStore::new(dir.path(), HISTORY_KEY).load();
    let stats = HistoryStats::from_history(&history);
    let chart = ChartSeries::from_history(&history);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Rounds played: {}  Best: {}", stats.rounds_played, stats.best_score);
    for ((label, score), accuracy) in chart.labels.iter().zip(&chart.scores).zip(&chart.accuracy) {
        println!("  {label}: {score} answered, {accuracy}% accuracy");
    }
    Ok(())
}
