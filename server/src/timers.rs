/// Timers driving the auto-play loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Main chain tick. At most one is pending at a time.
    MainTick,
    /// Fire-and-forget rotation bump after returning to base.
    OverlapAdvance,
}

/// Opaque handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub handle: TimerHandle,
    pub timer: Timer,
    pub due_ms: u64,
}

/// Single-shot timers on a virtual millisecond clock.
///
/// The clock only moves when the owner pops due timers or advances it, so the
/// same queue runs under tokio (fed with elapsed wall time) and in tests.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    pending: Vec<PendingTimer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, timer: Timer, delay_ms: u64) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push(PendingTimer {
            handle,
            timer,
            due_ms: self.now_ms + delay_ms,
        });
        handle
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn pending(&self) -> &[PendingTimer] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    /// Remove the earliest timer due at or before `until_ms` and move the
    /// clock to its due time. Timers due together fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<PendingTimer> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= until_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.handle))?;
        let popped = self.pending.remove(index);
        self.now_ms = self.now_ms.max(popped.due_ms);
        Some(popped)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock(&mut self, to_ms: u64) {
        self.now_ms = self.now_ms.max(to_ms);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
