//! Integration tests for the session engine state machine.

use std::cell::RefCell;
use std::rc::Rc;

use grove_core::storage::{EngineSettings, STORAGE_KEY};
use grove_core::{
    AudioCollaborator, BackgroundPolicy, Chime, ChimePlayer, Event, ManualClock, MemoryStore, Mode,
    SessionCompleted, SessionEngine,
};

const NOW: i64 = 1_700_000_000_000;

type TestEngine = SessionEngine<MemoryStore, ManualClock>;

fn fresh() -> (TestEngine, ManualClock, MemoryStore) {
    let clock = ManualClock::new(NOW);
    let store = MemoryStore::new();
    let settings = EngineSettings::default();
    let engine = SessionEngine::with_options(store.clone(), clock.clone(), settings);
    (engine, clock, store)
}

/// Engine rehydrated from a record that is running with `remaining_ms` left.
fn running_at(mode: Mode, remaining_ms: u64, session_count: u64) -> (TestEngine, ManualClock) {
    let clock = ManualClock::new(NOW);
    let json = format!(
        r#"{{"mode":"{mode}","isRunning":true,"remainingMs":{remaining_ms},
            "endAt":{},"sessionCount":{session_count},"species":"fern"}}"#,
        NOW + remaining_ms as i64
    );
    let store = MemoryStore::with_entry(STORAGE_KEY, &json);
    let engine = SessionEngine::with_options(store, clock.clone(), EngineSettings::default());
    (engine, clock)
}

fn record_completions(engine: &mut TestEngine) -> Rc<RefCell<Vec<SessionCompleted>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.subscribe(move |notice| sink.borrow_mut().push(*notice));
    seen
}

#[test]
fn focus_expiry_moves_to_break_and_counts_session() {
    let (mut engine, clock) = running_at(Mode::Focus, 1, 4);
    assert!(engine.is_running());
    assert_eq!(engine.remaining_ms(), 1);
    let seen = record_completions(&mut engine);

    clock.advance(1);
    let event = engine.on_frame();

    assert!(matches!(
        event,
        Some(Event::SessionCompleted {
            completed: Mode::Focus,
            next: Mode::Break,
            session_count: 5,
            ..
        })
    ));
    assert_eq!(engine.mode(), Mode::Break);
    assert_eq!(engine.remaining_ms(), engine.config().total_ms(Mode::Break));
    assert_eq!(engine.session_count(), 5);
    assert!(engine.is_running());

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, Mode::Focus);
}

#[test]
fn break_expiry_returns_to_focus_without_counting() {
    let (mut engine, clock) = running_at(Mode::Break, 10, 2);
    let seen = record_completions(&mut engine);

    clock.advance(50);
    engine.on_frame();

    assert_eq!(engine.mode(), Mode::Focus);
    assert_eq!(engine.session_count(), 2);
    assert_eq!(engine.remaining_ms(), engine.config().total_ms(Mode::Focus));
    assert!(engine.is_running());
    assert_eq!(seen.borrow()[0].kind, Mode::Break);
}

#[test]
fn huge_frame_gap_fires_exactly_one_completion() {
    let (mut engine, clock) = running_at(Mode::Focus, 1_000, 0);
    let seen = record_completions(&mut engine);

    clock.advance(24 * 60 * 60 * 1000);
    engine.on_frame();
    engine.on_frame();

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(engine.mode(), Mode::Break);
}

#[test]
fn full_cycle_through_frames() {
    let (mut engine, clock, _) = fresh();
    engine.set_durations(5.0, 1.0);
    engine.start();
    let seen = record_completions(&mut engine);

    for _ in 0..(6 * 60) {
        clock.advance(1_000);
        engine.on_frame();
    }

    let kinds: Vec<Mode> = seen.borrow().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![Mode::Focus, Mode::Break]);
    assert_eq!(engine.session_count(), 1);
    assert_eq!(engine.mode(), Mode::Focus);
}

#[test]
fn pause_twice_equals_pause_once() {
    let (mut engine, clock, store) = fresh();
    engine.start();
    clock.advance(3_000);
    engine.on_frame();

    assert!(engine.pause().is_some());
    let once = (engine.state(), store.get(STORAGE_KEY));
    assert!(engine.pause().is_none());
    let twice = (engine.state(), store.get(STORAGE_KEY));
    assert_eq!(once, twice);
}

#[test]
fn pause_and_resume_keep_remaining() {
    let (mut engine, clock, _) = fresh();
    engine.start();
    clock.advance(2_000);
    engine.on_frame();
    let remaining = engine.remaining_ms();

    engine.pause();
    clock.advance(60_000);
    engine.on_frame();
    engine.resume();
    assert_eq!(engine.remaining_ms(), remaining);

    clock.advance(500);
    engine.on_frame();
    assert_eq!(engine.remaining_ms(), remaining - 500);
}

#[test]
fn reset_from_running_restores_full_interval() {
    let (mut engine, clock) = running_at(Mode::Break, 30_000, 1);
    clock.advance(10_000);
    engine.on_frame();

    engine.reset();
    assert!(!engine.is_running());
    assert!(!engine.frame_requested());
    assert_eq!(engine.mode(), Mode::Break);
    assert_eq!(engine.remaining_ms(), engine.config().total_ms(Mode::Break));
}

#[test]
fn start_after_zero_restarts_full_length() {
    let clock = ManualClock::new(NOW);
    let json = r#"{"mode":"focus","isRunning":false,"remainingMs":0}"#;
    let store = MemoryStore::with_entry(STORAGE_KEY, json);
    let mut engine = SessionEngine::with_options(store, clock, EngineSettings::default());
    assert_eq!(engine.remaining_ms(), 0);

    engine.start();
    assert_eq!(engine.remaining_ms(), engine.config().total_ms(Mode::Focus));
}

#[test]
fn durations_apply_immediately_when_idle() {
    let (mut engine, _, _) = fresh();
    let event = engine.set_durations(50.0, 10.0);
    assert!(matches!(event, Some(Event::DurationsChanged { applied_now: true, .. })));
    assert_eq!(engine.remaining_ms(), 50 * 60_000);
    assert_eq!(engine.total_ms(), 50 * 60_000);
}

#[test]
fn durations_wait_for_next_interval_when_running() {
    let (mut engine, clock, _) = fresh();
    engine.start();
    clock.advance(1_000);
    engine.on_frame();

    let event = engine.set_durations(10.0, 2.0);
    assert!(matches!(event, Some(Event::DurationsChanged { applied_now: false, .. })));
    assert_eq!(engine.total_ms(), 25 * 60_000);
    assert_eq!(engine.remaining_ms(), 25 * 60_000 - 1_000);

    clock.advance(25 * 60_000);
    engine.on_frame();
    assert_eq!(engine.mode(), Mode::Break);
    assert_eq!(engine.total_ms(), 2 * 60_000);
}

#[test]
fn reanchor_discards_hidden_time() {
    let (mut engine, clock, _) = fresh();
    assert_eq!(engine.settings().background_policy, BackgroundPolicy::Reanchor);
    engine.start();
    clock.advance(1_000);
    engine.on_frame();

    engine.set_visible(false);
    clock.advance(10 * 60_000);
    engine.set_visible(true);
    clock.advance(16);
    engine.on_frame();

    assert_eq!(engine.remaining_ms(), 25 * 60_000 - 1_016);
}

#[test]
fn reconcile_honours_wall_clock_after_hiding() {
    let clock = ManualClock::new(NOW);
    let settings = EngineSettings {
        background_policy: BackgroundPolicy::Reconcile,
        ..EngineSettings::default()
    };
    let mut engine = SessionEngine::with_options(MemoryStore::new(), clock.clone(), settings);
    engine.start();

    engine.set_visible(false);
    clock.advance(10 * 60_000);
    engine.set_visible(true);
    assert_eq!(engine.remaining_ms(), 15 * 60_000);

    // Hidden past the end: one completion on the next frame, no more.
    let seen = record_completions(&mut engine);
    engine.set_visible(false);
    clock.advance(60 * 60_000);
    engine.set_visible(true);
    assert_eq!(engine.remaining_ms(), 0);
    engine.on_frame();
    engine.on_frame();
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(engine.mode(), Mode::Break);
}

#[test]
fn audio_collaborator_hears_completed_kind() {
    #[derive(Default)]
    struct Recorder(Vec<(Mode, f64)>);
    impl ChimePlayer for Recorder {
        fn play_chime(&mut self, chime: &Chime, volume: f64) {
            self.0.push((chime.kind, volume));
        }
    }

    let (mut engine, clock) = running_at(Mode::Focus, 100, 0);
    engine.set_volume(0.25);
    let audio = Rc::new(RefCell::new(AudioCollaborator::new(Recorder::default())));
    AudioCollaborator::attach(&audio, &mut engine);

    clock.advance(100);
    engine.on_frame();
    engine.set_muted(true);
    clock.advance(engine.remaining_ms());
    engine.on_frame();

    assert_eq!(audio.borrow().player().0, vec![(Mode::Focus, 0.25)]);
}

#[test]
fn tick_writes_are_throttled() {
    let (mut engine, clock, store) = fresh();
    engine.start();
    let after_start = store.write_count();

    for _ in 0..60 {
        clock.advance(16);
        engine.on_frame();
    }
    // ~960ms of frames: no write yet.
    assert_eq!(store.write_count(), after_start);

    clock.advance(100);
    engine.on_frame();
    assert_eq!(store.write_count(), after_start + 1);
}

#[test]
fn unavailable_store_does_not_stop_the_engine() {
    let (mut engine, clock, store) = fresh();
    store.set_unavailable(true);

    engine.start();
    clock.advance(25 * 60_000);
    let event = engine.on_frame();
    assert!(matches!(event, Some(Event::SessionCompleted { .. })));
    assert_eq!(engine.session_count(), 1);

    store.set_unavailable(false);
    engine.pause();
    assert!(store.get(STORAGE_KEY).unwrap().contains("\"sessionCount\":1"));
}
