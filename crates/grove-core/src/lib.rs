//! # Grove Core Library
//!
//! Timing and session-state engine for the Grove focus timer. Focus and
//! break intervals alternate forever; a cosmetic plant species is picked once
//! and kept; chimes are left to an audio collaborator.
//!
//! ## Architecture
//!
//! - **Session Engine**: a frame-driven countdown coupled to a two-state
//!   machine. The host calls `on_frame()` at its redraw rate; there are no
//!   threads or timers inside.
//! - **Rehydration**: on construction the engine rebuilds itself from the
//!   stored record, re-projecting a running interval onto the wall clock.
//! - **Storage**: one JSON record behind an opaque key-value [`StateStore`]
//!   (SQLite or in-memory), plus TOML host [`Settings`].
//! - **Audio**: completion notifications reach an [`AudioCollaborator`]
//!   through an explicit subscription.
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: clock and state machine
//! - [`SessionConfig`]: clamped focus/break durations
//! - [`StateStore`]: durable record transport
//! - [`Event`]: what each command did

pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use audio::{AudioCollaborator, Chime, ChimePlayer};
pub use config::{AudioPreferences, SessionConfig};
pub use error::{CoreError, SettingsError, StoreError};
pub use events::{Event, SessionCompleted};
pub use storage::{BackgroundPolicy, MemoryStore, Settings, SqliteStore, StateStore};
pub use timer::{ManualClock, Mode, SessionEngine, SessionState, Species, SystemClock, TimeSource};
