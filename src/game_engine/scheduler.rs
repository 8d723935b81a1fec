//! Virtual-clock task scheduler.
//!
//! No threads: the host advances the clock and the owner pulls due tasks
//! one at a time with [`Scheduler::pop_due`]. Pulling one at a time lets a
//! task's handler cancel or add tasks before the next one is considered.
//!
//! ```text
//! every(1000) ──► fires at 1000, 2000, 3000 ... until cancelled
//! after(400)  ──► fires once at now + 400
//! ```

/// Handle returned when a task is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Periodic countdown tick.
    Tick,
    /// One-shot: clear feedback and move to the next problem.
    AdvanceProblem,
}

/// A task that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTask {
    pub id: TaskId,
    pub kind: TaskKind,
    /// Round identity the task was scheduled for.
    pub round: u64,
    pub due_ms: u64,
}

#[derive(Debug, Clone)]
struct Task {
    id: TaskId,
    kind: TaskKind,
    round: u64,
    due_ms: u64,
    period_ms: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of live tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Schedule `kind` every `period_ms`, first firing one period from now.
    pub fn every(&mut self, period_ms: u64, round: u64, kind: TaskKind) -> TaskId {
        let period_ms = period_ms.max(1);
        self.insert(kind, round, self.now_ms + period_ms, Some(period_ms))
    }

    /// Schedule `kind` once, `delay_ms` from now.
    pub fn after(&mut self, delay_ms: u64, round: u64, kind: TaskKind) -> TaskId {
        self.insert(kind, round, self.now_ms + delay_ms, None)
    }

    /// Returns `true` if the task was still live.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Remove and return the earliest task due at or before `until_ms`,
    /// moving the clock to its due time. Periodic tasks are re-armed.
    /// Ties go to the task scheduled first.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<DueTask> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id.0))
            .map(|(i, _)| i)?;

        let due = {
            let task = &self.tasks[idx];
            DueTask { id: task.id, kind: task.kind, round: task.round, due_ms: task.due_ms }
        };
        self.now_ms = self.now_ms.max(due.due_ms);

        match self.tasks[idx].period_ms {
            Some(period) => self.tasks[idx].due_ms += period,
            None => {
                self.tasks.remove(idx);
            }
        }
        Some(due)
    }

    /// Move the clock forward to `until_ms` once nothing else is due.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    fn insert(&mut self, kind: TaskKind, round: u64, due_ms: u64, period_ms: Option<u64>) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.push(Task { id, kind, round, due_ms, period_ms });
        id
    }
}
