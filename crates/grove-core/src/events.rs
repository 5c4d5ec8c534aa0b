use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Mode, Species};

/// Every engine command that changes state produces an Event.
/// The CLI prints them; hosts may log or forward them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_ms: u64,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// An interval ran out and the next one began.
    SessionCompleted {
        completed: Mode,
        next: Mode,
        session_count: u64,
        at: DateTime<Utc>,
    },
    DurationsChanged {
        focus_minutes: f64,
        break_minutes: f64,
        /// Whether the idle countdown was recomputed to the new length.
        applied_now: bool,
        at: DateTime<Utc>,
    },
    AudioChanged {
        sound_muted: bool,
        volume: f64,
        ambient_on: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        is_running: bool,
        remaining_ms: u64,
        total_ms: u64,
        session_count: u64,
        progress: f64,
        species: Species,
        at: DateTime<Utc>,
    },
}

/// Payload delivered to completion subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionCompleted {
    /// The interval that just ended, not the one that started.
    pub kind: Mode,
    pub session_count: u64,
    pub sound_muted: bool,
    pub volume: f64,
}
