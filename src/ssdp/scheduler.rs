/*!
A time-indexed queue of due callbacks, standing in for the original
implementation's `task.LoopingCall` (periodic re-announce and validity sweep)
and `reactor.callLater` (jittered delayed `M-SEARCH` responses).

Design Note from `spec.md` §9: rather than the original's implicit
reactor-managed timer registry, delayed work is an explicit `BinaryHeap` of
due-at/kind pairs drained by the same loop that owns the primary socket recv,
so the whole engine stays on one thread with one blocking point.
*/
use crate::clock::Clock;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// Public Values
// ------------------------------------------------------------------------------------------------

/// Interval between unsolicited re-announcements of local devices, taken
/// from the original's `NOTIFY_INTERVAL`.
pub const REANNOUNCE_INTERVAL_SECS: u64 = 777;

/// Interval between validity sweeps of remote entries.
pub const VALIDITY_SWEEP_INTERVAL_SECS: u64 = 333;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Task {
    Reannounce,
    ValiditySweep,
    /// A one-shot, jittered response to an `M-SEARCH`, tagged with the
    /// search request id it answers so the engine can look up which
    /// datagram to send.
    SearchResponse(u64),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Entry {
    due_at_secs: u64,
    task: Task,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest due time sorts
        // to the top.
        other.due_at_secs.cmp(&self.due_at_secs)
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

///
/// Owns the due-at queue and the next search-request counter. Recurring
/// tasks (`Reannounce`, `ValiditySweep`) are re-enqueued by the caller after
/// firing; `schedule_once` is used for jittered search responses.
///
pub struct Scheduler {
    queue: BinaryHeap<Entry>,
    next_search_id: u64,
}

impl Scheduler {
    pub fn new(clock: &dyn Clock) -> Self {
        let now = clock.now().as_secs();
        let mut queue = BinaryHeap::new();
        queue.push(Entry {
            due_at_secs: now + REANNOUNCE_INTERVAL_SECS,
            task: Task::Reannounce,
        });
        queue.push(Entry {
            due_at_secs: now + VALIDITY_SWEEP_INTERVAL_SECS,
            task: Task::ValiditySweep,
        });
        Scheduler {
            queue,
            next_search_id: 0,
        }
    }

    /// Schedules a one-shot task `delay_secs` from `now_secs`. Returns the
    /// search-request id used to tag it, for `Task::SearchResponse`.
    pub fn schedule_search_response(&mut self, now_secs: u64, delay_secs: u64) -> u64 {
        let id = self.next_search_id;
        self.next_search_id += 1;
        self.queue.push(Entry {
            due_at_secs: now_secs + delay_secs,
            task: Task::SearchResponse(id),
        });
        id
    }

    fn reschedule_recurring(&mut self, now_secs: u64, task: Task, interval_secs: u64) {
        self.queue.push(Entry {
            due_at_secs: now_secs + interval_secs,
            task,
        });
    }

    /// The number of seconds until the next due task, or `None` if the
    /// queue is empty (never true in practice: the two recurring tasks are
    /// always present).
    pub fn next_due_in(&self, now_secs: u64) -> Option<Duration> {
        self.queue.peek().map(|entry| {
            Duration::from_secs(entry.due_at_secs.saturating_sub(now_secs))
        })
    }

    /// Pops and returns every task due at or before `now_secs`, re-enqueuing
    /// the recurring ones for their next interval.
    pub fn drain_due(&mut self, now_secs: u64) -> Vec<Task> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.peek() {
            if entry.due_at_secs > now_secs {
                break;
            }
            let entry = self.queue.pop().unwrap();
            due.push(entry.task);
            match entry.task {
                Task::Reannounce => {
                    self.reschedule_recurring(now_secs, Task::Reannounce, REANNOUNCE_INTERVAL_SECS)
                }
                Task::ValiditySweep => self.reschedule_recurring(
                    now_secs,
                    Task::ValiditySweep,
                    VALIDITY_SWEEP_INTERVAL_SECS,
                ),
                Task::SearchResponse(_) => {}
            }
        }
        due
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::test_support::FakeClock;

    #[test]
    fn recurring_tasks_seeded_on_construction() {
        let clock = FakeClock::at(0);
        let scheduler = Scheduler::new(&clock);
        assert_eq!(
            scheduler.next_due_in(0),
            Some(Duration::from_secs(VALIDITY_SWEEP_INTERVAL_SECS))
        );
    }

    #[test]
    fn search_response_fires_and_is_not_rescheduled() {
        let clock = FakeClock::at(0);
        let mut scheduler = Scheduler::new(&clock);
        let id = scheduler.schedule_search_response(0, 2);
        let due = scheduler.drain_due(2);
        assert_eq!(due, vec![Task::SearchResponse(id)]);
        let due_again = scheduler.drain_due(2);
        assert!(due_again.is_empty());
    }

    #[test]
    fn validity_sweep_reschedules_itself() {
        let clock = FakeClock::at(0);
        let mut scheduler = Scheduler::new(&clock);
        let due = scheduler.drain_due(VALIDITY_SWEEP_INTERVAL_SECS);
        assert!(due.contains(&Task::ValiditySweep));
        assert_eq!(
            scheduler.next_due_in(VALIDITY_SWEEP_INTERVAL_SECS),
            Some(Duration::from_secs(VALIDITY_SWEEP_INTERVAL_SECS))
        );
    }
}
