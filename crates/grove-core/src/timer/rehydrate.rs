//! Rebuilding session state from a stored record.
//!
//! Anything unusable in the record falls back to its default. A running
//! interval is re-projected onto the current wall clock through its `endAt`
//! stamp, but never given more time than the record last held.

use super::mode::{Mode, Species};
use crate::config::{
    minutes_to_ms, AudioPreferences, SessionConfig, BREAK_MINUTES_MAX, DEFAULT_BREAK_MINUTES,
    DEFAULT_FOCUS_MINUTES, DEFAULT_VOLUME, FOCUS_MINUTES_MAX,
};
use crate::storage::StoredRecord;

/// Session state recovered at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    pub config: SessionConfig,
    pub audio: AudioPreferences,
    pub mode: Mode,
    pub species: Species,
    pub session_count: u64,
    pub total_ms: u64,
    pub remaining_ms: u64,
    pub is_running: bool,
}

/// Remaining time to adopt for a running interval predicted to end at
/// `end_at`, given the remaining time last written.
///
/// The result never exceeds `persisted_remaining`: a wall clock that moved
/// backwards cannot hand out more time than was last known.
pub fn reconcile_remaining(end_at: i64, now: i64, persisted_remaining: u64) -> u64 {
    let estimated = u64::try_from(end_at.saturating_sub(now)).unwrap_or(0);
    estimated.min(persisted_remaining)
}

/// Recover state from `stored` as of wall-clock `now` (epoch ms).
pub fn restore(stored: Option<&StoredRecord>, now: i64) -> Restored {
    let fallback = StoredRecord::default();
    let stored = stored.unwrap_or(&fallback);

    let config = SessionConfig::new(
        stored.focus_minutes.unwrap_or(DEFAULT_FOCUS_MINUTES),
        stored.break_minutes.unwrap_or(DEFAULT_BREAK_MINUTES),
    );
    let audio = AudioPreferences::new(
        stored.sound_muted.unwrap_or(false),
        stored.volume.unwrap_or(DEFAULT_VOLUME),
        stored.ambient_on.unwrap_or(false),
    );
    let mode = stored.mode.unwrap_or_default();
    let species = stored.species.unwrap_or_else(Species::random);
    let session_count = stored.session_count.unwrap_or(0);

    let total_ms = stored
        .total_ms()
        .filter(|&total| total > 0 && total <= max_total_ms(mode))
        .unwrap_or_else(|| config.total_ms(mode));
    let mut remaining_ms = stored.remaining_ms().unwrap_or(total_ms).min(total_ms);

    let was_running = stored.is_running.unwrap_or(false);
    let is_running = match (was_running, stored.end_at()) {
        (true, Some(end_at)) => {
            remaining_ms = reconcile_remaining(end_at, now, remaining_ms);
            tracing::debug!(
                %mode,
                remaining_ms,
                behind_ms = now.saturating_sub(stored.saved_at().unwrap_or(now)),
                "resuming interval that was running when last saved"
            );
            true
        }
        (true, None) => {
            tracing::debug!(remaining_ms, "running record has no endAt; restoring paused");
            false
        }
        (false, _) => false,
    };

    Restored {
        config,
        audio,
        mode,
        species,
        session_count,
        total_ms,
        remaining_ms,
        is_running,
    }
}

fn max_total_ms(mode: Mode) -> u64 {
    match mode {
        Mode::Focus => minutes_to_ms(FOCUS_MINUTES_MAX),
        Mode::Break => minutes_to_ms(BREAK_MINUTES_MAX),
    }
}
