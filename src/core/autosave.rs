//! Debounced auto-save state machine.
//!
//! `AutoSave` is a plain value driven by explicit instants, so it runs the
//! same under a real clock, tokio's paused clock or hand-built instants in
//! tests. It owns the single debounce deadline and guarantees at most one
//! save is in flight: edits that arrive while saving only queue a follow-up.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

/// Debounce applied when no configuration overrides it.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(3);

/// Identifies one issued save so stale completions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Clean,
    /// Unsaved edits. `deadline` is `None` after a failed save with nothing
    /// new to send; the next edit arms it again.
    Dirty { deadline: Option<Instant> },
    /// A save is in flight. `follow_up` holds the debounce deadline of edits
    /// received meanwhile.
    Saving {
        ticket: SaveTicket,
        follow_up: Option<Instant>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveIndicator {
    Saving,
    Unsaved,
    Saved { at: Option<DateTime<Utc>> },
}

impl std::fmt::Display for SaveIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveIndicator::Saving => f.write_str("saving…"),
            SaveIndicator::Unsaved => f.write_str("unsaved changes"),
            SaveIndicator::Saved { at: Some(at) } => {
                write!(f, "last saved at {}", at.format("%H:%M:%S"))
            }
            SaveIndicator::Saved { at: None } => f.write_str("no changes"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutoSave {
    state: SaveState,
    debounce: Duration,
    next_ticket: u64,
    last_saved_at: Option<DateTime<Utc>>,
    consecutive_failures: u32,
}

impl AutoSave {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: SaveState::Clean,
            debounce,
            next_ticket: 0,
            last_saved_at: None,
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    /// True until every edit is confirmed persisted.
    pub fn is_dirty(&self) -> bool {
        !matches!(self.state, SaveState::Clean)
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, SaveState::Saving { .. })
    }

    /// No timer armed and nothing in flight.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.state,
            SaveState::Clean | SaveState::Dirty { deadline: None }
        )
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Deadline the driver should sleep until, if a save is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SaveState::Dirty { deadline } => deadline,
            _ => None,
        }
    }

    pub fn indicator(&self) -> SaveIndicator {
        match self.state {
            SaveState::Saving { .. } => SaveIndicator::Saving,
            SaveState::Dirty { .. } => SaveIndicator::Unsaved,
            SaveState::Clean => SaveIndicator::Saved {
                at: self.last_saved_at,
            },
        }
    }

    /// Register an edit, restarting the debounce window.
    pub fn record_edit(&mut self, now: Instant) {
        let deadline = now + self.debounce;
        self.state = match self.state {
            SaveState::Clean | SaveState::Dirty { .. } => SaveState::Dirty {
                deadline: Some(deadline),
            },
            SaveState::Saving { ticket, .. } => SaveState::Saving {
                ticket,
                follow_up: Some(deadline),
            },
        };
    }

    /// Start a save if the debounce deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<SaveTicket> {
        match self.state {
            SaveState::Dirty {
                deadline: Some(deadline),
            } if now >= deadline => {
                let ticket = SaveTicket(self.next_ticket);
                self.next_ticket += 1;
                self.state = SaveState::Saving {
                    ticket,
                    follow_up: None,
                };
                Some(ticket)
            }
            _ => None,
        }
    }

    /// Resolve the in-flight save. Returns `false` for a ticket that is not
    /// the one in flight.
    pub fn complete(&mut self, ticket: SaveTicket, succeeded: bool, at: DateTime<Utc>) -> bool {
        let follow_up = match self.state {
            SaveState::Saving {
                ticket: current,
                follow_up,
            } if current == ticket => follow_up,
            _ => return false,
        };

        if succeeded {
            self.last_saved_at = Some(at);
            self.consecutive_failures = 0;
            self.state = match follow_up {
                Some(deadline) => SaveState::Dirty {
                    deadline: Some(deadline),
                },
                None => SaveState::Clean,
            };
        } else {
            self.consecutive_failures += 1;
            self.state = SaveState::Dirty {
                deadline: follow_up,
            };
        }
        true
    }
}

impl Default for AutoSave {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
