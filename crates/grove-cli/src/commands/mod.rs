pub mod config;
pub mod sound;
pub mod timer;

use grove_core::{Event, Settings, SessionEngine, SqliteStore, SystemClock};

pub type CliEngine = SessionEngine<SqliteStore, SystemClock>;

/// Rehydrate the engine from the on-disk store.
pub fn open_engine(settings: &Settings) -> Result<CliEngine, Box<dyn std::error::Error>> {
    let store = SqliteStore::open_default()?;
    Ok(SessionEngine::with_options(
        store,
        SystemClock::new(),
        settings.engine.clone(),
    ))
}

/// Print the event a command produced, or a snapshot if it was a no-op.
pub fn print_outcome(
    engine: &CliEngine,
    event: Option<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    let event = event.unwrap_or_else(|| engine.snapshot());
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}
