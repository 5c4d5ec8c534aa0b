use clap::{Subcommand, ValueEnum};
use grove_core::Settings;

use super::{open_engine, print_outcome};

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum SoundAction {
    /// Silence chimes
    Mute,
    /// Re-enable chimes
    Unmute,
    /// Set chime volume (0.0-1.0)
    Volume {
        #[arg(allow_negative_numbers = true)]
        level: f64,
    },
    /// Toggle the ambient background loop
    Ambient {
        #[arg(value_enum)]
        state: Switch,
    },
}

pub fn run(action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let mut engine = open_engine(&settings)?;

    let event = match action {
        SoundAction::Mute => engine.set_muted(true),
        SoundAction::Unmute => engine.set_muted(false),
        SoundAction::Volume { level } => engine.set_volume(level),
        SoundAction::Ambient { state } => engine.set_ambient(matches!(state, Switch::On)),
    };
    print_outcome(&engine, event)
}
