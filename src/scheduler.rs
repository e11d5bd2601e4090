//! Virtual-clock job scheduler
//!
//! Every timer on the page (heart spawner, progress updater, ambient cycles,
//! confetti expiry, reveal cascades) is a job on one [`Scheduler`]. Time only
//! moves when the owner calls [`Scheduler::pop_due`] with a later deadline, so
//! a test can run one tick deterministically instead of waiting on real time.
//!
//! Jobs are plain data. The owner pops due jobs and routes them; a job may
//! schedule further jobs while it runs.

/// Milliseconds on the scheduler's clock.
pub type Millis = u64;

/// Handle to a scheduled timeout or interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<J> {
    id: TaskId,
    due: Millis,
    /// Insertion sequence, used to break ties between jobs due at the same time
    seq: u64,
    period: Option<Millis>,
    job: J,
}

/// Single-threaded cooperative scheduler over a virtual clock.
#[derive(Debug, Clone)]
pub struct Scheduler<J> {
    now: Millis,
    next_id: u64,
    next_seq: u64,
    entries: Vec<Entry<J>>,
}

impl<J> Default for Scheduler<J> {
    fn default() -> Self {
        Self { now: 0, next_id: 1, next_seq: 0, entries: Vec::new() }
    }
}

impl<J: Clone> Scheduler<J> {
    /// Create a scheduler with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Run `job` once, `delay` milliseconds from now.
    pub fn set_timeout(&mut self, delay: Millis, job: J) -> TaskId {
        self.insert(delay, None, job)
    }

    /// Run `job` every `period` milliseconds, first run one period from now.
    ///
    /// A zero period is treated as one millisecond so an interval can never
    /// starve the clock.
    pub fn set_interval(&mut self, period: Millis, job: J) -> TaskId {
        let period = period.max(1);
        self.insert(period, Some(period), job)
    }

    /// Cancel a timeout or interval. Returns `false` if it was not scheduled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Whether `id` is still scheduled.
    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Number of scheduled timeouts and intervals.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Number of scheduled entries whose job satisfies `pred`.
    pub fn count_matching(&self, pred: impl Fn(&J) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.job)).count()
    }

    /// Earliest due time, if anything is scheduled.
    pub fn next_due(&self) -> Option<Millis> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Pop the next job due at or before `until`, moving the clock to its due
    /// time. Intervals are re-armed one period later and keep their id.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TaskId, J)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;

        let due = self.entries[idx].due;
        self.now = self.now.max(due);

        match self.entries[idx].period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = &mut self.entries[idx];
                entry.due = due + period;
                entry.seq = seq;
                Some((entry.id, entry.job.clone()))
            }
            None => {
                let entry = self.entries.swap_remove(idx);
                Some((entry.id, entry.job))
            }
        }
    }

    /// Move the clock forward to `t` without running anything.
    pub fn advance_to(&mut self, t: Millis) {
        self.now = self.now.max(t);
    }

    fn insert(&mut self, delay: Millis, period: Option<Millis>, job: J) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.entries.push(Entry { id, due: self.now + delay, seq, period, job });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// A recurring task with explicit start/stop state.
///
/// Starting an already-running task cancels the previous registration first,
/// so there is never more than one active cycle per `Periodic`.
#[derive(Debug, Clone)]
pub struct Periodic {
    period: Millis,
    handle: Option<TaskId>,
}

impl Periodic {
    pub fn new(period: Millis) -> Self {
        Self { period, handle: None }
    }

    pub fn period(&self) -> Millis {
        self.period
    }

    /// (Re)start the cycle, running `job` every period.
    pub fn start<J: Clone>(&mut self, scheduler: &mut Scheduler<J>, job: J) {
        self.stop(scheduler);
        self.handle = Some(scheduler.set_interval(self.period, job));
    }

    /// Stop the cycle. Stopping a stopped task is a no-op returning `false`.
    pub fn stop<J: Clone>(&mut self, scheduler: &mut Scheduler<J>) -> bool {
        match self.handle.take() {
            Some(id) => scheduler.cancel(id),
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}
