//! Session engine: countdown clock plus the focus/break state machine.
//!
//! The engine does not use internal threads or timers. The host delivers
//! frames by calling [`SessionEngine::on_frame`] at its redraw rate; the
//! engine only advances while it has a frame requested, and `pause()` or
//! `reset()` withdraw that request so a late frame is a no-op.
//!
//! ## Transitions
//!
//! ```text
//! Focus --(countdown hits 0, session_count += 1)--> Break
//! Break --(countdown hits 0)----------------------> Focus
//! ```
//!
//! Every state change is written through the [`StateStore`] as one merged
//! record. Store failures are logged and otherwise ignored. An engine that
//! could not read the record at startup never writes it: its in-memory state
//! is a fallback, not the durable session.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(SqliteStore::open_default()?);
//! engine.subscribe(|done| println!("{} finished", done.kind));
//! engine.start();
//! // Once per redraw:
//! engine.on_frame(); // Returns Some(Event::SessionCompleted) on a transition
//! ```

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use super::clock::{SystemClock, TimeSource};
use super::mode::{Mode, Species};
use super::rehydrate::{self, reconcile_remaining};
use crate::config::{AudioPreferences, SessionConfig};
use crate::events::{Event, SessionCompleted};
use crate::error::StoreError;
use crate::storage::{
    BackgroundPolicy, EngineSettings, PersistedRecord, StateStore, StoredRecord, STORAGE_KEY,
};

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub mode: Mode,
    pub is_running: bool,
    pub remaining_ms: u64,
    /// Length of the in-flight interval, fixed when the interval began.
    pub total_ms: u64,
    pub session_count: u64,
    pub species: Species,
}

/// Frame-loop bookkeeping. Private to one engine.
#[derive(Debug, Clone, Copy, Default)]
struct ClockSnapshot {
    /// Monotonic reading at the previous frame.
    last_tick_ms: Option<u64>,
    frame_requested: bool,
}

/// Handle returned by [`SessionEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SessionCompleted)>;

pub struct SessionEngine<S: StateStore, C: TimeSource = SystemClock> {
    store: S,
    time: C,
    settings: EngineSettings,
    config: SessionConfig,
    audio: AudioPreferences,
    state: SessionState,
    clock: ClockSnapshot,
    visible: bool,
    /// Predicted wall-clock end written with the last record.
    end_at: Option<i64>,
    /// Stored object as last read or written; keeps keys we do not own.
    base: Map<String, Value>,
    last_persist_ms: Option<u64>,
    store_failing: bool,
    /// Set when the startup read failed; the record is left untouched.
    detached: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: StateStore> SessionEngine<S, SystemClock> {
    /// Rehydrate an engine from `store` using the system clocks.
    pub fn new(store: S) -> Self {
        Self::with_options(store, SystemClock::new(), EngineSettings::default())
    }
}

impl<S: StateStore, C: TimeSource> SessionEngine<S, C> {
    /// Rehydrate an engine from `store`.
    ///
    /// A malformed record is treated as empty. A store that cannot be read
    /// leaves the engine on defaults and is never written. If the record held
    /// a running interval with time left, the engine comes back running.
    pub fn with_options(store: S, time: C, settings: EngineSettings) -> Self {
        let now = time.epoch_ms();
        let (loaded, readable) = match store.load(STORAGE_KEY) {
            Ok(Some(json)) => {
                let parsed = StoredRecord::parse(&json);
                if parsed.is_none() {
                    tracing::warn!("stored session record is malformed; starting fresh");
                }
                (parsed, true)
            }
            Ok(None) => (None, true),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "could not read session record; running in memory without persistence"
                );
                (None, false)
            }
        };
        let (stored, base) = match loaded {
            Some((stored, base)) => (Some(stored), base),
            None => (None, Map::new()),
        };

        let restored = rehydrate::restore(stored.as_ref(), now);
        let mut engine = Self {
            store,
            time,
            settings,
            config: restored.config,
            audio: restored.audio,
            state: SessionState {
                mode: restored.mode,
                is_running: restored.is_running,
                remaining_ms: restored.remaining_ms,
                total_ms: restored.total_ms,
                session_count: restored.session_count,
                species: restored.species,
            },
            clock: ClockSnapshot::default(),
            visible: true,
            end_at: None,
            base,
            last_persist_ms: None,
            store_failing: false,
            detached: !readable,
            listeners: Vec::new(),
            next_subscription: 0,
        };

        if engine.state.is_running {
            engine.begin_loop();
        }
        // Pin the species and the re-projected endAt right away.
        engine.persist();
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn remaining_ms(&self) -> u64 {
        self.state.remaining_ms
    }

    pub fn total_ms(&self) -> u64 {
        self.state.total_ms
    }

    pub fn session_count(&self) -> u64 {
        self.state.session_count
    }

    pub fn species(&self) -> Species {
        self.state.species
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn audio(&self) -> AudioPreferences {
        self.audio
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn end_at(&self) -> Option<i64> {
        self.end_at
    }

    /// Whether the engine wants another frame.
    pub fn frame_requested(&self) -> bool {
        self.clock.frame_requested
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn progress(&self) -> f64 {
        let total = self.state.total_ms;
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.state.remaining_ms as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.state.mode,
            is_running: self.state.is_running,
            remaining_ms: self.state.remaining_ms,
            total_ms: self.state.total_ms,
            session_count: self.state.session_count,
            progress: self.progress(),
            species: self.state.species,
            at: Utc::now(),
        }
    }

    /// The record as it would be written now.
    pub fn record(&self) -> PersistedRecord {
        let now = self.time.epoch_ms();
        PersistedRecord {
            focus_minutes: self.config.focus_minutes(),
            break_minutes: self.config.break_minutes(),
            mode: self.state.mode,
            is_running: self.state.is_running,
            remaining_ms: self.state.remaining_ms,
            total_ms: self.state.total_ms,
            end_at: self.predicted_end(now),
            session_count: self.state.session_count,
            species: self.state.species,
            sound_muted: self.audio.sound_muted,
            volume: self.audio.volume(),
            ambient_on: self.audio.ambient_on,
            saved_at: now,
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Register a completion listener. It is called once per transition
    /// with the interval that just ended.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SessionCompleted) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running {
            return None; // Already running.
        }
        if self.state.remaining_ms == 0 {
            // Finished or fresh: restart full length.
            self.state.total_ms = self.config.total_ms(self.state.mode);
            self.state.remaining_ms = self.state.total_ms;
        }
        self.state.is_running = true;
        self.begin_loop();
        self.persist();
        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_ms: self.state.remaining_ms,
            total_ms: self.state.total_ms,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.is_running = false;
        self.stop_loop();
        self.persist();
        Some(Event::TimerPaused {
            remaining_ms: self.state.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Continue a paused countdown. A countdown sitting at zero completes on
    /// the next frame.
    pub fn resume(&mut self) -> Option<Event> {
        if self.state.is_running {
            return None;
        }
        self.state.is_running = true;
        self.begin_loop();
        self.persist();
        Some(Event::TimerResumed {
            remaining_ms: self.state.remaining_ms,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.stop_loop();
        self.state.is_running = false;
        self.state.total_ms = self.config.total_ms(self.state.mode);
        self.state.remaining_ms = self.state.total_ms;
        self.persist();
        Some(Event::TimerReset {
            mode: self.state.mode,
            remaining_ms: self.state.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Store new durations. An idle countdown picks them up immediately; a
    /// running one keeps its length and the change applies from the next
    /// interval.
    pub fn set_durations(&mut self, focus_minutes: f64, break_minutes: f64) -> Option<Event> {
        self.config = SessionConfig::new(focus_minutes, break_minutes);
        let applied_now = !self.state.is_running;
        if applied_now {
            self.state.total_ms = self.config.total_ms(self.state.mode);
            self.state.remaining_ms = self.state.total_ms;
        }
        self.persist();
        Some(Event::DurationsChanged {
            focus_minutes: self.config.focus_minutes(),
            break_minutes: self.config.break_minutes(),
            applied_now,
            at: Utc::now(),
        })
    }

    pub fn set_muted(&mut self, muted: bool) -> Option<Event> {
        self.audio.sound_muted = muted;
        self.audio_changed()
    }

    pub fn set_volume(&mut self, volume: f64) -> Option<Event> {
        self.audio.set_volume(volume);
        self.audio_changed()
    }

    pub fn set_ambient(&mut self, on: bool) -> Option<Event> {
        self.audio.ambient_on = on;
        self.audio_changed()
    }

    /// Deliver one frame. Returns `Some(Event::SessionCompleted)` when an
    /// interval ends during this frame.
    pub fn on_frame(&mut self) -> Option<Event> {
        if !self.clock.frame_requested || !self.state.is_running {
            return None;
        }
        let now = self.time.monotonic_ms();
        let delta = self
            .clock
            .last_tick_ms
            .map(|last| now.saturating_sub(last))
            .unwrap_or(0);
        self.clock.last_tick_ms = Some(now);

        let event = self.tick(delta);
        self.clock.frame_requested = self.state.is_running;
        if event.is_none() {
            self.persist_throttled(now);
        }
        event
    }

    /// Tell the engine whether its frames are currently being rendered.
    ///
    /// Hiding writes the record so a close while hidden rehydrates from a
    /// fresh `endAt`. Becoming visible applies the configured
    /// [`BackgroundPolicy`] and re-anchors the frame reference to now, so
    /// the hidden duration never arrives as one giant tick.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if !visible {
            self.persist();
            return;
        }
        if !self.state.is_running {
            return;
        }
        if self.settings.background_policy == BackgroundPolicy::Reconcile {
            if let Some(end_at) = self.end_at {
                let now = self.time.epoch_ms();
                self.state.remaining_ms = reconcile_remaining(end_at, now, self.state.remaining_ms);
            }
        }
        self.clock.last_tick_ms = Some(self.time.monotonic_ms());
        tracing::debug!(
            policy = ?self.settings.background_policy,
            remaining_ms = self.state.remaining_ms,
            "frames resumed after being hidden"
        );
        self.persist();
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply `delta_ms` of elapsed time to a running countdown.
    fn tick(&mut self, delta_ms: u64) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        if self.state.remaining_ms > 0 {
            self.state.remaining_ms = self.state.remaining_ms.saturating_sub(delta_ms);
            if self.state.remaining_ms > 0 {
                return None;
            }
        }
        // Hit zero on this tick, or was left at zero while nobody watched.
        Some(self.complete_interval())
    }

    fn complete_interval(&mut self) -> Event {
        let completed = self.state.mode;
        let next = completed.next();
        if completed == Mode::Focus {
            self.state.session_count += 1;
        }
        self.state.mode = next;
        self.state.total_ms = self.config.total_ms(next);
        self.state.remaining_ms = self.state.total_ms;
        tracing::debug!(
            %completed,
            %next,
            session_count = self.state.session_count,
            "interval completed"
        );

        let notice = SessionCompleted {
            kind: completed,
            session_count: self.state.session_count,
            sound_muted: self.audio.sound_muted,
            volume: self.audio.volume(),
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&notice);
        }

        self.persist();
        Event::SessionCompleted {
            completed,
            next,
            session_count: self.state.session_count,
            at: Utc::now(),
        }
    }

    fn audio_changed(&mut self) -> Option<Event> {
        self.persist();
        Some(Event::AudioChanged {
            sound_muted: self.audio.sound_muted,
            volume: self.audio.volume(),
            ambient_on: self.audio.ambient_on,
            at: Utc::now(),
        })
    }

    fn begin_loop(&mut self) {
        self.clock.last_tick_ms = Some(self.time.monotonic_ms());
        self.clock.frame_requested = true;
    }

    fn stop_loop(&mut self) {
        self.clock.last_tick_ms = None;
        self.clock.frame_requested = false;
    }

    fn predicted_end(&self, now: i64) -> Option<i64> {
        self.state
            .is_running
            .then(|| now.saturating_add(i64::try_from(self.state.remaining_ms).unwrap_or(i64::MAX)))
    }

    fn persist_throttled(&mut self, now_monotonic: u64) {
        let due = match self.last_persist_ms {
            Some(last) => now_monotonic.saturating_sub(last) >= self.settings.persist_interval_ms,
            None => true,
        };
        if due {
            self.persist();
        }
    }

    /// Write the whole merged record. Failures are logged, never returned.
    fn persist(&mut self) {
        let record = self.record();
        self.end_at = record.end_at;
        self.last_persist_ms = Some(self.time.monotonic_ms());
        if self.detached {
            return;
        }

        match self.write_record(&record) {
            Ok(()) => {
                if self.store_failing {
                    tracing::info!("session store writable again");
                }
                self.store_failing = false;
            }
            Err(err) if !self.store_failing => {
                tracing::warn!(error = %err, "session store unavailable; continuing in memory");
                self.store_failing = true;
            }
            Err(err) => tracing::debug!(error = %err, "session store still unavailable"),
        }
    }

    fn write_record(&mut self, record: &PersistedRecord) -> Result<(), StoreError> {
        let merged = record.merge_into(&self.base)?;
        self.store.save(STORAGE_KEY, &merged.to_string())?;
        if let Value::Object(fields) = merged {
            self.base = fields;
        }
        Ok(())
    }
}
