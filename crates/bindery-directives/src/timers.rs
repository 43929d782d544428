//! Notification timers
//!
//! One-shot timers on a virtual millisecond clock. The page advances the
//! clock; due actions come back in due-time order.

use bindery_dom::NodeId;

/// Work a timer performs when it fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    /// Add `class` back to `element`
    Hide { element: NodeId, class: String },
}

/// Timer entry
#[derive(Debug, Clone)]
struct Timer {
    id: u32,
    due_ms: u64,
    action: TimerAction,
}

/// Timer queue
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: u32,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `action` to run `delay_ms` from now; returns the timer id
    pub fn schedule(&mut self, delay_ms: u64, action: TimerAction) -> u32 {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push(Timer {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            action,
        });
        id
    }

    /// Clear a timer
    pub fn clear(&mut self, id: u32) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Move the clock forward and take every timer that became due
    ///
    /// Ties fire in scheduling order.
    pub fn advance(&mut self, ms: u64) -> Vec<TimerAction> {
        self.now_ms = self.now_ms.saturating_add(ms);
        let now = self.now_ms;

        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            std::mem::take(&mut self.timers).into_iter().partition(|t| t.due_ms <= now);
        self.timers = pending;

        due.sort_by_key(|t| (t.due_ms, t.id));
        due.into_iter().map(|t| t.action).collect()
    }

    /// Check if there are pending timers
    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Milliseconds until the next timer fires
    pub fn time_until_next(&self) -> Option<u64> {
        self.timers
            .iter()
            .map(|t| t.due_ms.saturating_sub(self.now_ms))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hide(n: u32) -> TimerAction {
        TimerAction::Hide {
            element: NodeId::ROOT,
            class: format!("h{n}"),
        }
    }

    #[test]
    fn test_advance_fires_due_in_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(5000, hide(1));
        timers.schedule(3000, hide(2));
        timers.schedule(3000, hide(3));

        assert_eq!(timers.time_until_next(), Some(3000));
        assert!(timers.advance(2999).is_empty());
        assert_eq!(timers.advance(1), vec![hide(2), hide(3)]);
        assert_eq!(timers.pending(), 1);
        assert_eq!(timers.time_until_next(), Some(2000));
        assert_eq!(timers.advance(10_000), vec![hide(1)]);
        assert!(!timers.has_pending());
        assert_eq!(timers.now_ms(), 13_000);
    }

    #[test]
    fn test_clear() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(10, hide(1));
        assert!(timers.clear(id));
        assert!(!timers.clear(id));
        assert!(timers.advance(100).is_empty());
    }
}
