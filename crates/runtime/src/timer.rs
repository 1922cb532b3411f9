use foundation::time::Time;

/// Handle for a scheduled one-shot deadline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug)]
struct TimerEntry {
    id: TimerId,
    tag: &'static str,
    deadline: Time,
    cancelled: bool,
}

/// One-shot deadlines driven by engine time.
///
/// Key properties:
/// - A cancelled timer never fires, even if its deadline has already passed.
/// - Firing order is deterministic: `(deadline, id)`.
/// - Cancellation does not perturb the order of remaining timers.
///
/// This replaces callback-chained timeouts: sequencing code schedules tagged
/// deadlines and reacts to the tags that fire each frame.
#[derive(Debug, Default)]
pub struct TimerSet {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_in(&mut self, tag: &'static str, now: Time, delay_s: f64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(TimerEntry {
            id,
            tag,
            deadline: now.after(delay_s.max(0.0)),
            cancelled: false,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id && !e.cancelled) {
            Some(entry) => {
                entry.cancelled = true;
                true
            }
            None => false,
        }
    }

    /// Cancels every pending timer. Used when a superseding sequence starts,
    /// so stale deadlines from an aborted run can never fire.
    pub fn cancel_all(&mut self) {
        for entry in &mut self.entries {
            entry.cancelled = true;
        }
    }

    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| !e.cancelled).count()
    }

    /// Removes and returns the tags of all timers due at `now`, in
    /// `(deadline, id)` order. Cancelled entries are dropped silently.
    pub fn fire_due(&mut self, now: Time) -> Vec<&'static str> {
        let mut due: Vec<(Time, TimerId, &'static str)> = Vec::new();
        self.entries.retain(|e| {
            if e.cancelled {
                return false;
            }
            if e.deadline.0 <= now.0 {
                due.push((e.deadline, e.id, e.tag));
                return false;
            }
            true
        });
        due.sort_by(|a, b| {
            a.0.0
                .partial_cmp(&b.0.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        due.into_iter().map(|(_, _, tag)| tag).collect()
    }
}
