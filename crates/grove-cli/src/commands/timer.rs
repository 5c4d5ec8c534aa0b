use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use clap::Subcommand;
use grove_core::{AudioCollaborator, Chime, ChimePlayer, Settings};

use super::{open_engine, print_outcome, CliEngine};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown (full length if the last one ran out)
    Start,
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Stop and refill the current interval
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Drive the timer in the foreground until Ctrl-C
    Watch {
        /// Frames per second (defaults to settings)
        #[arg(long)]
        fps: Option<u32>,
        /// Start the countdown if it is not running
        #[arg(long)]
        start: bool,
    },
}

/// Rings the terminal bell in place of real audio.
struct TerminalBell {
    enabled: bool,
}

impl ChimePlayer for TerminalBell {
    fn play_chime(&mut self, chime: &Chime, volume: f64) {
        if self.enabled {
            eprint!("\x07");
        }
        tracing::info!(kind = %chime.kind, volume, "chime");
    }

    fn set_ambient(&mut self, on: bool, volume: f64) {
        tracing::info!(on, volume, "ambient");
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let mut engine = open_engine(&settings)?;

    match action {
        TimerAction::Start => {
            let event = engine.start();
            print_outcome(&engine, event)?;
        }
        TimerAction::Pause => {
            let event = engine.pause();
            print_outcome(&engine, event)?;
        }
        TimerAction::Resume => {
            let event = engine.resume();
            print_outcome(&engine, event)?;
        }
        TimerAction::Reset => {
            let event = engine.reset();
            print_outcome(&engine, event)?;
        }
        TimerAction::Status => {
            // A countdown that ran out while nobody watched completes here.
            let completed = engine.on_frame();
            print_outcome(&engine, None)?;
            if let Some(event) = completed {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Watch { fps, start } => {
            let fps = fps.unwrap_or(settings.cli.fps).clamp(1, 120);
            if start {
                engine.start();
            }
            watch(engine, fps, settings.cli.bell)?;
        }
    }
    Ok(())
}

pub fn set_durations(focus: f64, break_minutes: f64) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let mut engine = open_engine(&settings)?;
    let event = engine.set_durations(focus, break_minutes);
    print_outcome(&engine, event)
}

fn watch(mut engine: CliEngine, fps: u32, bell: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !engine.frame_requested() {
        return print_outcome(&engine, None);
    }

    let audio = Rc::new(RefCell::new(AudioCollaborator::new(TerminalBell { enabled: bell })));
    audio.borrow_mut().sync_ambient(&engine.audio());
    AudioCollaborator::attach(&audio, &mut engine);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(Duration::from_millis(1000 / u64::from(fps)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                _ = ticker.tick() => {
                    if let Some(event) = engine.on_frame() {
                        eprintln!();
                        println!("{}", serde_json::to_string_pretty(&event)?);
                    }
                    render_line(&engine);
                    if !engine.frame_requested() {
                        break;
                    }
                }
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    eprintln!();
    // Leave a fresh record behind for the next invocation.
    engine.set_visible(false);
    Ok(())
}

fn render_line(engine: &CliEngine) {
    let remaining_secs = engine.remaining_ms().div_ceil(1000);
    let width = 24usize;
    let filled = (engine.progress() * width as f64).round() as usize;
    eprint!(
        "\r{:<5} {:02}:{:02} [{}{}] #{} {}",
        engine.mode(),
        remaining_secs / 60,
        remaining_secs % 60,
        "#".repeat(filled.min(width)),
        "-".repeat(width - filled.min(width)),
        engine.session_count(),
        engine.species().as_str(),
    );
    let _ = std::io::stderr().flush();
}
