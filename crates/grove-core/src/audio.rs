//! Audio collaborator interface.
//!
//! The engine only announces completions; turning them into sound is up to
//! a [`ChimePlayer`]. [`AudioCollaborator`] sits between the two and applies
//! the user's mute, volume and ambient preferences.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::AudioPreferences;
use crate::events::SessionCompleted;
use crate::storage::StateStore;
use crate::timer::{Mode, SessionEngine, SubscriptionId, TimeSource};

/// A short note sequence played when an interval ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chime {
    pub kind: Mode,
    pub notes_hz: &'static [f64],
    pub note_ms: u32,
}

const FOCUS_DONE_NOTES: [f64; 3] = [659.25, 523.25, 392.0];
const BREAK_DONE_NOTES: [f64; 3] = [392.0, 523.25, 659.25];

impl Chime {
    /// Falling notes close a focus interval, rising notes close a break.
    pub fn for_kind(kind: Mode) -> Self {
        let notes_hz: &'static [f64] = match kind {
            Mode::Focus => &FOCUS_DONE_NOTES,
            Mode::Break => &BREAK_DONE_NOTES,
        };
        Self {
            kind,
            notes_hz,
            note_ms: 180,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        self.note_ms.saturating_mul(self.notes_hz.len() as u32)
    }
}

/// Something that can make sound.
pub trait ChimePlayer {
    fn play_chime(&mut self, chime: &Chime, volume: f64);

    /// Start or stop the ambient background loop.
    fn set_ambient(&mut self, _on: bool, _volume: f64) {}
}

pub struct AudioCollaborator<P: ChimePlayer> {
    player: P,
    ambient_playing: bool,
}

impl<P: ChimePlayer> AudioCollaborator<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            ambient_playing: false,
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Completion notification from the engine.
    pub fn session_completed(&mut self, notice: &SessionCompleted) {
        let prefs = AudioPreferences::new(notice.sound_muted, notice.volume, self.ambient_playing);
        self.play_chime(notice.kind, &prefs);
    }

    /// Play the chime for `kind` unless muted or silent.
    pub fn play_chime(&mut self, kind: Mode, prefs: &AudioPreferences) {
        let volume = prefs.effective_volume();
        if volume <= 0.0 {
            tracing::debug!(%kind, "chime suppressed");
            return;
        }
        self.player.play_chime(&Chime::for_kind(kind), volume);
    }

    /// Bring the ambient loop in line with `prefs`.
    pub fn sync_ambient(&mut self, prefs: &AudioPreferences) {
        let wanted = prefs.ambient_on && !prefs.sound_muted;
        if wanted != self.ambient_playing {
            self.player.set_ambient(wanted, prefs.volume());
            self.ambient_playing = wanted;
        }
    }
}

impl<P: ChimePlayer + 'static> AudioCollaborator<P> {
    /// Subscribe a shared collaborator to `engine`'s completion channel.
    pub fn attach<S, C>(
        this: &Rc<RefCell<Self>>,
        engine: &mut SessionEngine<S, C>,
    ) -> SubscriptionId
    where
        S: StateStore,
        C: TimeSource,
    {
        let audio = Rc::clone(this);
        engine.subscribe(move |notice| audio.borrow_mut().session_completed(notice))
    }
}
