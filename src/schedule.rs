//! Cooperative timers.
//!
//! Nothing here sleeps. A controller arms a timer with [`Scheduler::after`],
//! the host calls [`Scheduler::fire_due`] from its tick, and the controller
//! re-evaluates when its token comes back. Arming a purpose cancels the
//! pending timer of the same purpose first, so there is never more than one
//! live timer per purpose.

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;

use tracing::debug;

/// What a timer is for. At most one timer per purpose is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Hover arrows: re-run the hover update without pointer movement.
    HoverUpdate,
    /// Drag dwell: re-evaluate the drop target when a dwell threshold passes.
    DropTarget,
}

/// Handle for one armed timer; used to cancel it or to match it when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    id: u64,
    pub purpose: TimerPurpose,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: TimerToken,
    due_ms: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer `delay_ms` after `now_ms`, cancelling any pending timer
    /// with the same purpose.
    pub fn after(&mut self, now_ms: u64, delay_ms: u64, purpose: TimerPurpose) -> TimerToken {
        self.cancel_purpose(purpose);
        self.next_id += 1;
        let token = TimerToken { id: self.next_id, purpose };
        let due_ms = now_ms.saturating_add(delay_ms);
        self.pending.push(Pending { token, due_ms });
        debug!(?purpose, due_ms, "timer armed");
        token
    }

    /// Cancel one timer. Returns whether it was still pending.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.token != token);
        before != self.pending.len()
    }

    /// Cancel whatever is pending for `purpose`.
    pub fn cancel_purpose(&mut self, purpose: TimerPurpose) {
        self.pending.retain(|p| p.token.purpose != purpose);
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Remove and return every timer due at `now_ms`, earliest first.
    pub fn fire_due(&mut self, now_ms: u64) -> Vec<TimerToken> {
        let mut due: Vec<Pending> = self.pending.iter().copied().filter(|p| p.due_ms <= now_ms).collect();
        self.pending.retain(|p| p.due_ms > now_ms);
        due.sort_by_key(|p| (p.due_ms, p.token.id));
        due.into_iter().map(|p| p.token).collect()
    }

    /// Due time of the pending timer for `purpose`.
    #[must_use]
    pub fn due_at(&self, purpose: TimerPurpose) -> Option<u64> {
        self.pending.iter().find(|p| p.token.purpose == purpose).map(|p| p.due_ms)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}
