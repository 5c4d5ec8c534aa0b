//! Session durations and audio preferences.
//!
//! Both are always valid: every constructor and setter clamps its input, and
//! non-finite numbers fall back to the lower bound.

use serde::Serialize;

use crate::timer::Mode;

pub const FOCUS_MINUTES_MIN: f64 = 5.0;
pub const FOCUS_MINUTES_MAX: f64 = 120.0;
pub const BREAK_MINUTES_MIN: f64 = 1.0;
pub const BREAK_MINUTES_MAX: f64 = 60.0;

pub const DEFAULT_FOCUS_MINUTES: f64 = 25.0;
pub const DEFAULT_BREAK_MINUTES: f64 = 5.0;
pub const DEFAULT_VOLUME: f64 = 0.6;

/// Clamp `value` into `[min, max]`; NaN and infinities map to `min`.
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}

/// Convert minutes to whole milliseconds.
///
/// Saturates instead of overflowing; negative and non-finite input yields 0.
pub fn minutes_to_ms(minutes: f64) -> u64 {
    let ms = (minutes * 60_000.0).round();
    if ms.is_finite() && ms > 0.0 {
        // `as` saturates at u64::MAX.
        ms as u64
    } else {
        0
    }
}

/// Focus and break lengths in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    focus_minutes: f64,
    break_minutes: f64,
}

impl SessionConfig {
    pub fn new(focus_minutes: f64, break_minutes: f64) -> Self {
        Self {
            focus_minutes: clamp_finite(focus_minutes, FOCUS_MINUTES_MIN, FOCUS_MINUTES_MAX),
            break_minutes: clamp_finite(break_minutes, BREAK_MINUTES_MIN, BREAK_MINUTES_MAX),
        }
    }

    pub fn focus_minutes(&self) -> f64 {
        self.focus_minutes
    }

    pub fn break_minutes(&self) -> f64 {
        self.break_minutes
    }

    pub fn minutes(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Focus => self.focus_minutes,
            Mode::Break => self.break_minutes,
        }
    }

    /// Full length of an interval of `mode`, in milliseconds.
    pub fn total_ms(&self, mode: Mode) -> u64 {
        minutes_to_ms(self.minutes(mode))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

/// Preferences consumed by the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPreferences {
    pub sound_muted: bool,
    volume: f64,
    pub ambient_on: bool,
}

impl AudioPreferences {
    pub fn new(sound_muted: bool, volume: f64, ambient_on: bool) -> Self {
        Self {
            sound_muted,
            volume: clamp_finite(volume, 0.0, 1.0),
            ambient_on,
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = clamp_finite(volume, 0.0, 1.0);
    }

    /// Volume a chime should actually play at.
    pub fn effective_volume(&self) -> f64 {
        if self.sound_muted {
            0.0
        } else {
            self.volume
        }
    }
}

impl Default for AudioPreferences {
    fn default() -> Self {
        Self {
            sound_muted: false,
            volume: DEFAULT_VOLUME,
            ambient_on: false,
        }
    }
}
