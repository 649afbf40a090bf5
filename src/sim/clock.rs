//! Virtual clock and task scheduler
//!
//! Periodic room behavior (direction changes, hunter spawn checks) and the
//! delayed game-over exit are deadlines in a min-heap keyed by virtual
//! milliseconds. Nothing here reads wall-clock time, so tests drive the
//! simulation by advancing the clock.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Scheduled work items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    /// Re-randomize wandering enemy velocities
    ChangeEnemyDirections,
    /// Roll for the late hunter spawn
    CheckEnemySpawn,
    /// Leave the room scene after game over
    ExitToMenu,
}

/// Handle returned when scheduling; used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

/// A task occurrence that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTask {
    pub id: TimerId,
    pub task: Task,
    /// Virtual time the occurrence was scheduled for
    pub due_ms: u64,
}

// Field order matters: entries sort by deadline, then insertion order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    due_ms: u64,
    seq: u64,
    id: TimerId,
    task: Task,
    /// Repeat period; `None` for one-shot tasks
    period_ms: Option<u64>,
}

/// Min-heap of task deadlines over a virtual millisecond clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    heap: BinaryHeap<Reverse<Entry>>,
    next_id: u32,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[inline]
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Run `task` every `period_ms`, first at `now + period_ms`
    pub fn add_repeating(&mut self, task: Task, period_ms: u64) -> TimerId {
        let period_ms = period_ms.max(1);
        self.push(task, self.now_ms + period_ms, Some(period_ms))
    }

    /// Run `task` once at `now + delay_ms`
    pub fn add_once(&mut self, task: Task, delay_ms: u64) -> TimerId {
        self.push(task, self.now_ms + delay_ms, None)
    }

    /// Run `task` once at the absolute time `due_ms`. A deadline already
    /// behind the clock fires on the next advance.
    pub fn add_once_at(&mut self, task: Task, due_ms: u64) -> TimerId {
        self.push(task, due_ms, None)
    }

    fn push(&mut self, task: Task, due_ms: u64, period_ms: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.push_entry(id, task, due_ms, period_ms);
        id
    }

    fn push_entry(&mut self, id: TimerId, task: Task, due_ms: u64, period_ms: Option<u64>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            due_ms,
            seq,
            id,
            task,
            period_ms,
        }));
    }

    /// Remove a timer. Returns false if it was unknown or already fired.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|Reverse(entry)| entry.id != id);
        self.heap.len() != before
    }

    /// Drop every pending timer (scene teardown)
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Move the clock forward to `now_ms`, returning every occurrence that
    /// came due, in deadline order. Repeating timers re-arm one period after
    /// their previous deadline, so a long step yields each missed occurrence.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<DueTask> {
        self.now_ms = self.now_ms.max(now_ms);

        let mut due = Vec::new();
        while let Some(Reverse(head)) = self.heap.peek() {
            if head.due_ms > self.now_ms {
                break;
            }
            let Some(Reverse(entry)) = self.heap.pop() else {
                break;
            };
            log::trace!("Timer {:?} fired {:?} at {}ms", entry.id, entry.task, entry.due_ms);
            due.push(DueTask {
                id: entry.id,
                task: entry.task,
                due_ms: entry.due_ms,
            });
            if let Some(period) = entry.period_ms {
                self.push_entry(entry.id, entry.task, entry.due_ms + period, Some(period));
            }
        }
        due
    }

    /// Advance by a delta; see [`Scheduler::advance_to`]
    pub fn advance(&mut self, dt_ms: u64) -> Vec<DueTask> {
        self.advance_to(self.now_ms + dt_ms)
    }
}
