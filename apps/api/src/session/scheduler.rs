//! Autosave scheduling: decides *when* buffered edits are flushed.
//!
//! Pure state machine: no timers, no I/O. The caller feeds it events with the
//! current instant and acts on the returned [`Decision`].
//!
//! | state \ event       | edit recorded        | timer fired            | save now                 | flush settled                        |
//! |---------------------|----------------------|------------------------|--------------------------|--------------------------------------|
//! | Idle                | Pending(now + d)     | -                      | Flushing, start flush    | -                                    |
//! | Pending(t)          | Pending(now + d)     | now ≥ t: Flushing, start | Flushing, start flush  | -                                    |
//! | Flushing            | FlushingPending(now + d) | -                  | queue explicit flush     | Idle, or queued: Flushing, start     |
//! | FlushingPending(t)  | FlushingPending(now + d) | deferred           | drop timer, queue explicit | Pending(t), or queued: Flushing, start |
//!
//! At most one flush is ever in flight.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing buffered, nothing in flight.
    Idle,
    /// Debounce timer armed.
    Pending { deadline: Instant },
    /// One flush in flight, no timer.
    Flushing,
    /// One flush in flight and a timer armed; the timer may not fire until the flush settles.
    FlushingPending { deadline: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Wait,
    StartFlush,
}

#[derive(Debug)]
pub struct AutosaveScheduler {
    debounce: Duration,
    state: SchedulerState,
    explicit_queued: bool,
}

impl AutosaveScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            state: SchedulerState::Idle,
            explicit_queued: false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// The instant the caller should wake up at, if a timer is allowed to fire.
    /// A timer armed during a flush is not reported until the flush settles.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Pending { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn is_flushing(&self) -> bool {
        matches!(
            self.state,
            SchedulerState::Flushing | SchedulerState::FlushingPending { .. }
        )
    }

    pub fn edit_recorded(&mut self, now: Instant) -> Decision {
        let deadline = now + self.debounce;
        self.state = match self.state {
            SchedulerState::Idle | SchedulerState::Pending { .. } => {
                SchedulerState::Pending { deadline }
            }
            SchedulerState::Flushing | SchedulerState::FlushingPending { .. } => {
                SchedulerState::FlushingPending { deadline }
            }
        };
        Decision::Wait
    }

    pub fn timer_fired(&mut self, now: Instant) -> Decision {
        match self.state {
            SchedulerState::Pending { deadline } if now >= deadline => {
                self.state = SchedulerState::Flushing;
                Decision::StartFlush
            }
            _ => Decision::Wait,
        }
    }

    pub fn save_requested(&mut self) -> Decision {
        match self.state {
            SchedulerState::Idle | SchedulerState::Pending { .. } => {
                self.state = SchedulerState::Flushing;
                Decision::StartFlush
            }
            SchedulerState::Flushing | SchedulerState::FlushingPending { .. } => {
                self.state = SchedulerState::Flushing;
                self.explicit_queued = true;
                Decision::Wait
            }
        }
    }

    /// Called once the in-flight flush resolved, successfully or not.
    pub fn flush_settled(&mut self) -> Decision {
        match self.state {
            SchedulerState::Idle | SchedulerState::Pending { .. } => Decision::Wait,
            _ if self.explicit_queued => {
                self.explicit_queued = false;
                self.state = SchedulerState::Flushing;
                Decision::StartFlush
            }
            SchedulerState::Flushing => {
                self.state = SchedulerState::Idle;
                Decision::Wait
            }
            SchedulerState::FlushingPending { deadline } => {
                self.state = SchedulerState::Pending { deadline };
                Decision::Wait
            }
        }
    }
}
