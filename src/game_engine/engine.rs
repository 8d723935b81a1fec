//! Round lifecycle state machine.
//!
//! ```text
//! Idle ──start──► Playing ──time up──► Finished
//!  ▲                 │                    │
//!  └─────reset───────┴──────reset─────────┘   (start is valid from anywhere)
//! ```
//!
//! The engine owns two timers on its [`Scheduler`]: the periodic countdown
//! ticker and the one-shot pause after each answer. Both are cancelled
//! whenever the phase leaves `Playing`, and every task is checked against
//! the current round and phase before it touches state.

use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::game_engine::{
    generator::generate,
    models::{
        DifficultyTier, Feedback, Phase, Problem, RoundHistory, RoundSnapshot, RoundState,
        RoundSummary,
    },
    scheduler::{DueTask, Scheduler, TaskId, TaskKind},
};
use crate::storage::HistoryStore;

pub struct RoundEngine<R: Rng, S: HistoryStore> {
    config: GameConfig,
    rng: R,
    store: S,
    scheduler: Scheduler,
    state: RoundState,
    pending_input: String,
    history: RoundHistory,
    last_summary: Option<RoundSummary>,
    /// Bumped on every `start`; scheduled tasks carry the value they saw.
    round_id: u64,
    ticker: Option<TaskId>,
    advance_task: Option<TaskId>,
    last_tier: DifficultyTier,
}

impl<S: HistoryStore> RoundEngine<StdRng, S> {
    /// Default config and an entropy-seeded RNG.
    pub fn with_store(store: S) -> Self {
        RoundEngine::new(GameConfig::default(), StdRng::from_entropy(), store)
    }
}

impl<R: Rng, S: HistoryStore> RoundEngine<R, S> {
    /// Build an idle engine, seeding history from `store`.
    pub fn new(config: GameConfig, rng: R, store: S) -> Self {
        let config = config.validated();
        let history = store.load();
        info!(rounds = history.len(), high_score = history.high_score(), "round engine ready");
        RoundEngine {
            state: RoundState::idle(config.round_secs),
            config,
            rng,
            store,
            scheduler: Scheduler::new(),
            pending_input: String::new(),
            history,
            last_summary: None,
            round_id: 0,
            ticker: None,
            advance_task: None,
            last_tier: DifficultyTier::Easy,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn incorrect_count(&self) -> u32 {
        self.state.incorrect_count
    }

    pub fn time_remaining(&self) -> u32 {
        self.state.time_remaining
    }

    pub fn current_problem(&self) -> Option<&Problem> {
        self.state.current_problem.as_ref()
    }

    pub fn feedback(&self) -> Feedback {
        self.state.feedback
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    /// Always derived from history.
    pub fn high_score(&self) -> u32 {
        self.history.high_score()
    }

    /// Summary of the round that just ended, until the next start or reset.
    pub fn last_summary(&self) -> Option<&RoundSummary> {
        self.last_summary.as_ref()
    }

    pub fn tier(&self) -> DifficultyTier {
        self.config.tier_for(self.state.score)
    }

    /// Virtual clock in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn accepts_input(&self) -> bool {
        self.state.phase == Phase::Playing
            && self.state.current_problem.is_some()
            && self.state.feedback == Feedback::None
    }

    pub fn can_start(&self) -> bool {
        matches!(self.state.phase, Phase::Idle | Phase::Finished)
    }

    pub fn is_new_high_score(&self) -> bool {
        self.last_summary
            .as_ref()
            .is_some_and(|s| s.score > 0 && s.score >= self.high_score())
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.state.phase,
            score: self.state.score,
            incorrect_count: self.state.incorrect_count,
            time_remaining: self.state.time_remaining,
            question: self.state.current_problem.as_ref().map(|p| p.question.clone()),
            feedback: self.state.feedback,
            pending_input: self.pending_input.clone(),
            tier: self.tier(),
            high_score: self.high_score(),
            accepts_input: self.accepts_input(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh round from any phase.
    pub fn start(&mut self) {
        self.cancel_timers();
        self.round_id += 1;
        self.state = RoundState {
            phase: Phase::Playing,
            score: 0,
            incorrect_count: 0,
            time_remaining: self.config.round_secs,
            current_problem: None,
            feedback: Feedback::None,
        };
        self.pending_input.clear();
        self.last_summary = None;
        self.last_tier = DifficultyTier::Easy;
        self.next_problem();
        self.ticker = Some(self.scheduler.every(
            self.config.tick_interval_ms,
            self.round_id,
            TaskKind::Tick,
        ));
        info!(round = self.round_id, secs = self.config.round_secs, "round started");
    }

    /// Back to `Idle`. History is untouched.
    pub fn reset(&mut self) {
        self.cancel_timers();
        self.state = RoundState::idle(self.config.round_secs);
        self.pending_input.clear();
        self.last_summary = None;
        debug!(round = self.round_id, "engine reset");
    }

    /// One unit of countdown. Ignored unless `Playing`.
    pub fn tick(&mut self) {
        if self.state.phase != Phase::Playing {
            return;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        if self.state.time_remaining == 0 {
            self.finish();
        }
    }

    /// Replace the pending answer text, keeping only ASCII digits.
    pub fn set_pending_input(&mut self, text: &str) {
        if !self.accepts_input() {
            return;
        }
        self.pending_input = text.chars().filter(char::is_ascii_digit).collect();
    }

    /// Submit whatever is in the pending input buffer.
    pub fn submit(&mut self) -> Option<Feedback> {
        let raw = self.pending_input.clone();
        self.submit_answer(&raw)
    }

    /// Judge `raw` against the current problem.
    ///
    /// Returns `None` when the submission is ignored: not playing, no
    /// problem, feedback still showing, empty text or non-digit text.
    pub fn submit_answer(&mut self, raw: &str) -> Option<Feedback> {
        if !self.accepts_input() || raw.is_empty() {
            return None;
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            debug!(input = raw, "ignoring non-numeric submission");
            return None;
        }
        let expected = self.state.current_problem.as_ref()?.answer;
        // All digits but too long for i64 cannot match any answer.
        let correct = raw.parse::<i64>().is_ok_and(|n| n == expected);

        let feedback = if correct {
            self.state.score += 1;
            Feedback::Correct
        } else {
            self.state.incorrect_count += 1;
            Feedback::Incorrect
        };
        self.state.feedback = feedback;
        self.pending_input.clear();
        self.advance_task = Some(self.scheduler.after(
            self.config.feedback_delay_ms,
            self.round_id,
            TaskKind::AdvanceProblem,
        ));
        debug!(
            round = self.round_id,
            ?feedback,
            score = self.state.score,
            incorrect = self.state.incorrect_count,
            "answer judged"
        );
        Some(feedback)
    }

    /// Move the virtual clock forward, running every timer that comes due.
    pub fn advance_time(&mut self, ms: u64) {
        let target = self.scheduler.now_ms().saturating_add(ms);
        while let Some(due) = self.scheduler.pop_due(target) {
            self.dispatch(due);
        }
        self.scheduler.settle(target);
    }

    /// Stop every timer. State is left as it is.
    pub fn teardown(&mut self) {
        self.cancel_timers();
        self.scheduler.cancel_all();
    }

    // ── Internals ────────────────────────────────────────────────────

    fn dispatch(&mut self, due: DueTask) {
        if due.round != self.round_id || self.state.phase != Phase::Playing {
            debug!(
                task = ?due.kind,
                task_round = due.round,
                round = self.round_id,
                "dropping stale task"
            );
            return;
        }
        match due.kind {
            TaskKind::Tick => self.tick(),
            TaskKind::AdvanceProblem => {
                self.advance_task = None;
                self.state.feedback = Feedback::None;
                self.next_problem();
            }
        }
    }

    fn next_problem(&mut self) {
        let tier = self.tier();
        if tier != self.last_tier {
            debug!(
                from = %self.last_tier,
                to = %tier,
                score = self.state.score,
                "difficulty changed"
            );
            self.last_tier = tier;
        }
        self.state.current_problem = Some(generate(&mut self.rng, tier));
    }

    fn finish(&mut self) {
        self.cancel_timers();
        self.state.phase = Phase::Finished;
        self.state.feedback = Feedback::None;
        self.pending_input.clear();

        let summary = RoundSummary::new(self.state.score, self.state.incorrect_count, Utc::now());
        self.history.push(summary.clone());
        if let Err(e) = self.store.save(&self.history) {
            warn!(error = %e, "failed to save round history");
        }
        info!(
            round = self.round_id,
            score = summary.score,
            incorrect = summary.incorrect_count,
            accuracy = summary.accuracy_percent,
            high_score = self.high_score(),
            "round finished"
        );
        self.last_summary = Some(summary);
    }

    fn cancel_timers(&mut self) {
        if let Some(id) = self.ticker.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.advance_task.take() {
            self.scheduler.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::DateTime;

    type Engine = RoundEngine<StdRng, MemoryStore>;

    fn engine_with(store: MemoryStore) -> Engine {
        RoundEngine::new(GameConfig::default(), StdRng::seed_from_u64(42), store)
    }

    fn engine() -> Engine {
        engine_with(MemoryStore::new("mathTrainerPastRounds"))
    }

    fn answer(e: &Engine) -> i64 {
        e.current_problem().expect("problem while playing").answer
    }

    fn answer_right(e: &mut Engine) {
        let a = answer(e).to_string();
        assert_eq!(e.submit_answer(&a), Some(Feedback::Correct));
        e.advance_time(400);
    }

    fn answer_wrong(e: &mut Engine) {
        let a = (answer(e) + 1).to_string();
        assert_eq!(e.submit_answer(&a), Some(Feedback::Incorrect));
        e.advance_time(400);
    }

    #[test]
    fn new_engine_is_idle() {
        let e = engine();
        assert_eq!(e.phase(), Phase::Idle);
        assert_eq!(e.time_remaining(), 30);
        assert!(e.current_problem().is_none());
        assert!(e.can_start());
        assert!(!e.accepts_input());
    }

    #[test]
    fn start_sets_up_a_fresh_round() {
        let mut e = engine();
        e.start();
        assert_eq!(e.phase(), Phase::Playing);
        assert_eq!(e.score(), 0);
        assert_eq!(e.incorrect_count(), 0);
        assert_eq!(e.time_remaining(), 30);
        assert_eq!(e.tier(), DifficultyTier::Easy);
        assert_eq!(e.feedback(), Feedback::None);
        assert!(e.current_problem().is_some());
        assert!(!e.can_start());
    }

    #[test]
    fn thirty_ticks_finish_the_round_exactly_once() {
        let mut e = engine();
        e.start();
        for _ in 0..29 {
            e.tick();
            assert_eq!(e.phase(), Phase::Playing);
        }
        e.tick();
        assert_eq!(e.phase(), Phase::Finished);
        assert_eq!(e.time_remaining(), 0);
        assert_eq!(e.history().len(), 1);

        e.tick();
        assert_eq!(e.phase(), Phase::Finished);
        assert_eq!(e.time_remaining(), 0);
        assert_eq!(e.history().len(), 1);
    }

    #[test]
    fn ticker_drives_the_countdown() {
        let mut e = engine();
        e.start();
        e.advance_time(999);
        assert_eq!(e.time_remaining(), 30);
        e.advance_time(1);
        assert_eq!(e.time_remaining(), 29);
        e.advance_time(29_000);
        assert_eq!(e.phase(), Phase::Finished);
        assert_eq!(e.history().len(), 1);

        e.advance_time(60_000);
        assert_eq!(e.history().len(), 1);
        assert_eq!(e.time_remaining(), 0);
    }

    #[test]
    fn correct_answer_scores_and_pauses_before_next_problem() {
        let mut e = engine();
        e.start();
        e.set_pending_input(&answer(&e).to_string());
        assert_eq!(e.submit(), Some(Feedback::Correct));
        assert_eq!(e.score(), 1);
        assert_eq!(e.feedback(), Feedback::Correct);
        assert_eq!(e.pending_input(), "");
        assert!(!e.accepts_input());

        e.advance_time(399);
        assert_eq!(e.feedback(), Feedback::Correct);
        e.advance_time(1);
        assert_eq!(e.feedback(), Feedback::None);
        assert!(e.current_problem().is_some());
        assert!(e.accepts_input());
    }

    #[test]
    fn wrong_answer_counts_as_incorrect() {
        let mut e = engine();
        e.start();
        answer_wrong(&mut e);
        assert_eq!(e.score(), 0);
        assert_eq!(e.incorrect_count(), 1);
        assert_eq!(e.feedback(), Feedback::None);
    }

    #[test]
    fn input_is_locked_while_feedback_shows() {
        let mut e = engine();
        e.start();
        let a = answer(&e).to_string();
        e.submit_answer(&a);
        assert_eq!(e.submit_answer(&a), None);
        e.set_pending_input("12");
        assert_eq!(e.pending_input(), "");
        assert_eq!(e.score() + e.incorrect_count(), 1);
    }

    #[test]
    fn ignored_submissions_change_nothing() {
        let mut e = engine();
        assert_eq!(e.submit_answer("4"), None);

        e.start();
        let before = e.snapshot();
        assert_eq!(e.submit_answer(""), None);
        assert_eq!(e.submit_answer("-3"), None);
        assert_eq!(e.submit_answer("1 2"), None);
        assert_eq!(e.submit(), None);
        assert_eq!(e.snapshot(), before);
    }

    #[test]
    fn oversized_digit_string_is_a_miss() {
        let mut e = engine();
        e.start();
        assert_eq!(e.submit_answer("99999999999999999999999"), Some(Feedback::Incorrect));
        assert_eq!(e.incorrect_count(), 1);
    }

    #[test]
    fn pending_input_keeps_digits_only() {
        let mut e = engine();
        e.start();
        e.set_pending_input("1a2-3 ");
        assert_eq!(e.pending_input(), "123");
    }

    #[test]
    fn difficulty_climbs_with_score() {
        let mut e = engine();
        e.start();
        for _ in 0..4 {
            answer_right(&mut e);
        }
        assert_eq!(e.tier(), DifficultyTier::Easy);
        answer_right(&mut e);
        assert_eq!(e.tier(), DifficultyTier::Medium);
        for _ in 0..4 {
            answer_right(&mut e);
        }
        assert_eq!(e.score(), 9);
        assert_eq!(e.tier(), DifficultyTier::Medium);
        answer_right(&mut e);
        assert_eq!(e.tier(), DifficultyTier::Hard);
        assert_eq!(e.snapshot().tier, DifficultyTier::Hard);
    }

    #[test]
    fn summary_records_accuracy() {
        let mut e = engine();
        e.start();
        for _ in 0..7 {
            answer_right(&mut e);
        }
        for _ in 0..3 {
            answer_wrong(&mut e);
        }
        e.advance_time(30_000);
        let s = e.last_summary().unwrap();
        assert_eq!((s.score, s.incorrect_count, s.accuracy_percent), (7, 3, 70));
        assert!(e.is_new_high_score());
        assert_eq!(e.high_score(), 7);
    }

    #[test]
    fn empty_round_has_zero_accuracy_and_no_high_score() {
        let mut e = engine();
        e.start();
        e.advance_time(30_000);
        let s = e.last_summary().unwrap();
        assert_eq!(s.accuracy_percent, 0);
        assert!(!e.is_new_high_score());
    }

    #[test]
    fn restart_cancels_pending_feedback() {
        let mut e = engine();
        e.start();
        let a = answer(&e).to_string();
        e.submit_answer(&a);

        e.start();
        let fresh = e.current_problem().cloned();
        e.advance_time(400);
        assert_eq!(e.score(), 0);
        assert_eq!(e.feedback(), Feedback::None);
        assert_eq!(e.current_problem().cloned(), fresh);
    }

    #[test]
    fn reset_stops_the_clock_and_is_idempotent() {
        let mut e = engine();
        e.start();
        answer_right(&mut e);
        e.submit_answer(&answer(&e).to_string());

        e.reset();
        let first = e.snapshot();
        e.reset();
        assert_eq!(e.snapshot(), first);
        assert_eq!(first.phase, Phase::Idle);
        assert_eq!(first.score, 0);
        assert_eq!(first.question, None);
        assert_eq!(first.feedback, Feedback::None);

        e.advance_time(60_000);
        assert_eq!(e.snapshot(), first);
        assert!(e.history().is_empty());
    }

    #[test]
    fn round_ending_mid_feedback_cancels_the_pause() {
        let mut e = engine();
        e.start();
        e.advance_time(29_800);
        e.submit_answer(&answer(&e).to_string());
        e.advance_time(200);
        assert_eq!(e.phase(), Phase::Finished);
        assert_eq!(e.feedback(), Feedback::None);
        let frozen = e.snapshot();
        e.advance_time(1_000);
        assert_eq!(e.snapshot(), frozen);
    }

    #[test]
    fn finished_round_is_persisted() {
        let mut e = engine();
        e.start();
        answer_right(&mut e);
        e.advance_time(30_000);

        let saved: RoundHistory = serde_json::from_str(e.store.raw().unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.rounds()[0].score, 1);
    }

    #[test]
    fn failed_save_is_not_fatal() {
        let mut store = MemoryStore::new("k");
        store.fail_writes = true;
        let mut e = engine_with(store);
        e.start();
        e.advance_time(30_000);
        assert_eq!(e.phase(), Phase::Finished);
        assert_eq!(e.history().len(), 1);
        e.start();
        assert_eq!(e.phase(), Phase::Playing);
    }

    #[test]
    fn high_score_comes_from_loaded_history() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let seeded = RoundHistory::from(vec![RoundSummary::new(3, 1, at), RoundSummary::new(8, 2, at)]);
        let raw = serde_json::to_string(&seeded).unwrap();

        let e = engine_with(MemoryStore::new("k").with_raw(raw));
        assert_eq!(e.high_score(), 8);
        assert_eq!(e.history().len(), 2);
    }

    #[test]
    fn zero_length_config_still_finishes_on_first_tick() {
        let config = GameConfig { round_secs: 0, ..GameConfig::default() };
        let mut e = RoundEngine::new(config, StdRng::seed_from_u64(1), MemoryStore::new("k"));
        e.start();
        assert_eq!(e.time_remaining(), 1);
        e.advance_time(1_000);
        assert_eq!(e.phase(), Phase::Finished);
        assert_eq!(e.time_remaining(), 0);
        assert_eq!(e.history().len(), 1);
    }

    #[test]
    fn inverted_thresholds_still_pass_through_medium() {
        let config = GameConfig {
            medium_threshold: 10,
            hard_threshold: 5,
            ..GameConfig::default()
        };
        let mut e = RoundEngine::new(config, StdRng::seed_from_u64(4), MemoryStore::new("k"));
        e.start();
        for _ in 0..5 {
            answer_right(&mut e);
        }
        assert_eq!(e.tier(), DifficultyTier::Medium);
    }

    #[test]
    fn new_round_opens_on_easy_after_a_hard_round() {
        let mut e = engine();
        e.start();
        for _ in 0..10 {
            answer_right(&mut e);
        }
        assert_eq!(e.last_tier, DifficultyTier::Hard);
        e.start();
        assert_eq!(e.last_tier, DifficultyTier::Easy);
        assert_eq!(e.tier(), DifficultyTier::Easy);
    }

    #[test]
    fn tasks_from_an_earlier_round_are_dropped() {
        let mut e = engine();
        e.start();
        e.submit_answer(&answer(&e).to_string());
        let before = e.snapshot();

        let old_round = e.round_id - 1;
        e.scheduler.after(100, old_round, TaskKind::AdvanceProblem);
        e.scheduler.every(100, old_round, TaskKind::Tick);
        e.advance_time(300);

        assert_eq!(e.snapshot(), before);
        assert_eq!(e.feedback(), Feedback::Correct);
        assert_eq!(e.time_remaining(), 30);

        e.advance_time(100);
        assert_eq!(e.feedback(), Feedback::None);
    }

    #[test]
    fn tasks_firing_outside_play_are_dropped() {
        let mut e = engine();
        e.start();
        e.reset();
        let round = e.round_id;
        e.scheduler.after(100, round, TaskKind::AdvanceProblem);
        e.scheduler.after(100, round, TaskKind::Tick);
        let before = e.snapshot();
        e.advance_time(100);
        assert_eq!(e.snapshot(), before);
        assert!(e.current_problem().is_none());
    }

    #[test]
    fn teardown_silences_timers() {
        let mut e = engine();
        e.start();
        e.submit_answer(&answer(&e).to_string());
        e.teardown();
        e.advance_time(60_000);
        assert_eq!(e.time_remaining(), 30);
        assert_eq!(e.feedback(), Feedback::Correct);
    }
}
