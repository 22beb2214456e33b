//! Game loop engine
//!
//! Owns the session state and its three collaborators (canvas, audio, frame
//! scheduler). The UI shell drives it with `start`, `toggle_pause`, `restart`
//! and `stop`, and the frame scheduler calls `tick` once per frame.
//!
//! At most one frame request is outstanding at any time. Leaving the running
//! state (pause, crash, stop, drop) always withdraws it and quiets the engine
//! hum, so nothing keeps running after the game stops.

use std::rc::Rc;

use crate::audio::{AudioSink, EngineSound, SoundCue};
use crate::config::{ConfigError, GameConfig};
use crate::platform::{FrameHandle, FrameScheduler};
use crate::renderer::{self, Canvas};
use crate::sim::{self, GameEvent, GameState, GameStatus, InputState};

/// What the UI needs each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudSnapshot {
    pub score: u64,
    pub status: GameStatus,
    pub autopilot: bool,
}

/// State of the looping engine cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hum {
    Silent,
    Running,
    Paused,
}

pub struct Engine<C: Canvas, A: AudioSink, F: FrameScheduler> {
    state: GameState,
    input: Rc<InputState>,
    canvas: C,
    audio: A,
    frames: F,
    pending_frame: Option<FrameHandle>,
    hum: Hum,
}

impl<C: Canvas, A: AudioSink, F: FrameScheduler> Engine<C, A, F> {
    pub fn new(
        config: GameConfig,
        seed: u64,
        canvas: C,
        audio: A,
        frames: F,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: GameState::new(config, seed),
            input: Rc::new(InputState::new()),
            canvas,
            audio,
            frames,
            pending_frame: None,
            hum: Hum::Silent,
        })
    }

    /// Shared input flags for key handlers
    pub fn input(&self) -> Rc<InputState> {
        Rc::clone(&self.input)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted scenes and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.state.score,
            status: self.state.status,
            autopilot: self.input.autopilot(),
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    /// Whether a frame request is outstanding
    pub fn frame_pending(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Begin a fresh run from any state
    pub fn start(&mut self) {
        self.state.reset_for_run();
        self.set_hum(EngineSound::Start);
        self.schedule_frame();
        log::info!("Run started (seed {})", self.state.seed);
    }

    /// "Play again": only from the title screen or after a crash
    pub fn restart(&mut self) -> bool {
        match self.state.status {
            GameStatus::NotStarted | GameStatus::Over => {
                self.start();
                true
            }
            GameStatus::Running | GameStatus::Paused => false,
        }
    }

    /// Advance one frame. Called by the frame scheduler.
    pub fn tick(&mut self, timestamp_ms: f64) -> Vec<GameEvent> {
        // The frame being delivered is spent; drop any stray request too
        self.cancel_frame();

        if self.state.status != GameStatus::Running {
            return Vec::new();
        }

        let input = self.input.snapshot();
        let events = sim::tick(&mut self.state, &input, timestamp_ms);

        for event in &events {
            match event {
                GameEvent::Crashed { .. } => self.audio.play(SoundCue::Crash),
                GameEvent::Scored { .. } => self.audio.play(SoundCue::Score),
                GameEvent::Spawned { .. } => {}
            }
        }

        renderer::draw_frame(&mut self.canvas, &self.state);

        match self.state.status {
            GameStatus::Running => self.schedule_frame(),
            GameStatus::Over => {
                log::info!("Game over - score {}", self.state.score);
                self.stop();
            }
            GameStatus::NotStarted | GameStatus::Paused => {}
        }

        events
    }

    /// Running <-> Paused; any other state is left alone
    pub fn toggle_pause(&mut self) -> GameStatus {
        match self.state.status {
            GameStatus::Running => {
                self.state.status = GameStatus::Paused;
                self.state.spawn_clock.freeze();
                self.cancel_frame();
                self.set_hum(EngineSound::Pause);
                log::info!("Paused at score {}", self.state.score);
            }
            GameStatus::Paused => {
                self.state.status = GameStatus::Running;
                self.set_hum(EngineSound::Resume);
                self.schedule_frame();
                log::info!("Resumed");
            }
            GameStatus::NotStarted | GameStatus::Over => {}
        }
        self.state.status
    }

    /// Withdraw the pending frame and silence the engine. A run still in
    /// progress ends as Over with the road cleared, so `restart` can pick it
    /// up again. Safe to call twice.
    pub fn stop(&mut self) {
        self.cancel_frame();
        if self.hum != Hum::Silent {
            self.set_hum(EngineSound::Stop);
        }
        if matches!(self.state.status, GameStatus::Running | GameStatus::Paused) {
            self.state.status = GameStatus::Over;
            self.state.obstacles.clear();
            log::info!("Run stopped at score {}", self.state.score);
        }
    }

    fn schedule_frame(&mut self) {
        if self.pending_frame.is_some() {
            return;
        }
        self.pending_frame = self.frames.request();
        if self.pending_frame.is_none() {
            log::warn!("Could not schedule next frame");
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.frames.cancel(handle);
        }
    }

    fn set_hum(&mut self, sound: EngineSound) {
        self.audio.engine(sound);
        self.hum = match sound {
            EngineSound::Start | EngineSound::Resume => Hum::Running,
            EngineSound::Pause => Hum::Paused,
            EngineSound::Stop => Hum::Silent,
        };
    }
}

impl<C: Canvas, A: AudioSink, F: FrameScheduler> Drop for Engine<C, A, F> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualFrames;
    use crate::renderer::{Color, Recorder};
    use std::cell::RefCell;

    /// Everything the engine asked the audio sink to do
    #[derive(Debug, Default)]
    struct Tape {
        cues: Vec<SoundCue>,
        engine: Vec<EngineSound>,
    }

    #[derive(Debug, Default, Clone)]
    struct SharedTape(Rc<RefCell<Tape>>);

    impl AudioSink for SharedTape {
        fn play(&mut self, cue: SoundCue) {
            self.0.borrow_mut().cues.push(cue);
        }

        fn engine(&mut self, sound: EngineSound) {
            self.0.borrow_mut().engine.push(sound);
        }
    }

    #[derive(Debug, Default, Clone)]
    struct SharedFrames(Rc<RefCell<ManualFrames>>);

    impl FrameScheduler for SharedFrames {
        fn request(&mut self) -> Option<FrameHandle> {
            self.0.borrow_mut().request()
        }

        fn cancel(&mut self, handle: FrameHandle) {
            self.0.borrow_mut().cancel(handle)
        }
    }

    type TestEngine = Engine<Recorder, SharedTape, ManualFrames>;

    fn engine() -> (TestEngine, SharedTape) {
        let tape = SharedTape::default();
        let engine = Engine::new(
            GameConfig::default(),
            1234,
            Recorder::new(),
            tape.clone(),
            ManualFrames::new(),
        )
        .unwrap();
        (engine, tape)
    }

    /// Start a run with the spawn timer just restarted, so scripted obstacles
    /// have the road to themselves
    fn start_scripted(engine: &mut TestEngine) {
        engine.start();
        engine.state_mut().spawn_clock.reset();
    }

    /// Deliver pending frames 1 ms apart, checking the one-in-flight rule
    fn pump(engine: &mut TestEngine, clock: &mut f64, frames: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..frames {
            assert!(engine.frames().pending().len() <= 1);
            if engine.frames_mut().take_pending().is_none() {
                break;
            }
            *clock += 1.0;
            events.extend(engine.tick(*clock));
        }
        events
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = GameConfig {
            obstacle_width: 900.0,
            ..Default::default()
        };
        let result = Engine::new(config, 1, Recorder::new(), SharedTape::default(), ManualFrames::new());
        assert!(matches!(result, Err(ConfigError::TooWide { .. })));
    }

    #[test]
    fn test_start() {
        let (mut engine, tape) = engine();
        assert_eq!(engine.status(), GameStatus::NotStarted);
        assert!(!engine.frame_pending());

        engine.start();
        assert_eq!(engine.status(), GameStatus::Running);
        assert_eq!(engine.frames().pending().len(), 1);
        assert_eq!(tape.0.borrow().engine, vec![EngineSound::Start]);

        // A second start never doubles the frame request
        engine.start();
        assert_eq!(engine.frames().pending().len(), 1);
    }

    #[test]
    fn test_tick_draws_and_reschedules() {
        let (mut engine, _tape) = engine();
        engine.start();
        let mut clock = 0.0;
        pump(&mut engine, &mut clock, 10);

        assert_eq!(engine.canvas().frames, 10);
        assert_eq!(engine.frames().requested, 11);
        assert_eq!(engine.frames().pending().len(), 1);
        let cars: Vec<_> = engine.canvas().fills(Color::CAR).collect();
        assert_eq!(cars.len(), 1);
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let (mut engine, tape) = engine();
        assert!(engine.tick(100.0).is_empty());
        assert_eq!(engine.canvas().frames, 0);
        assert!(!engine.frame_pending());
        assert!(tape.0.borrow().engine.is_empty());
    }

    #[test]
    fn test_crash_ends_run_and_tears_down() {
        let (mut engine, tape) = engine();
        start_scripted(&mut engine);
        engine.state_mut().place_obstacle(375.0, -80.0, 4.0);

        let mut clock = 0.0;
        let events = pump(&mut engine, &mut clock, 170);

        assert_eq!(engine.status(), GameStatus::Over);
        assert_eq!(engine.score(), 0);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::Crashed { .. }))
                .count(),
            1
        );
        assert_eq!(tape.0.borrow().cues, vec![SoundCue::Crash]);
        assert_eq!(
            tape.0.borrow().engine,
            vec![EngineSound::Start, EngineSound::Stop]
        );
        assert!(!engine.frame_pending());
        assert!(engine.frames().pending().is_empty());
    }

    #[test]
    fn test_score_plays_cue() {
        let (mut engine, tape) = engine();
        start_scripted(&mut engine);
        engine.state_mut().place_obstacle(0.0, -80.0, 5.0);

        let mut clock = 0.0;
        pump(&mut engine, &mut clock, 137);

        assert_eq!(engine.score(), 10);
        assert_eq!(engine.status(), GameStatus::Running);
        assert_eq!(tape.0.borrow().cues, vec![SoundCue::Score]);
        assert!(engine.state().obstacles.is_empty());
    }

    #[test]
    fn test_pause_freezes_everything() {
        let (mut engine, tape) = engine();
        start_scripted(&mut engine);
        engine.state_mut().place_obstacle(100.0, -80.0, 4.0);
        let mut clock = 0.0;
        pump(&mut engine, &mut clock, 20);

        let y = engine.state().obstacles[0].rect.y();
        let waited = engine.state().spawn_clock.since_spawn_ms();

        assert_eq!(engine.toggle_pause(), GameStatus::Paused);
        assert!(engine.frames().pending().is_empty());
        assert_eq!(engine.frames().cancelled, 1);

        // Nothing delivered while paused; even a stray tick is ignored
        assert!(pump(&mut engine, &mut clock, 5).is_empty());
        assert!(engine.tick(60_000.0).is_empty());
        assert_eq!(engine.state().obstacles[0].rect.y(), y);

        assert_eq!(engine.toggle_pause(), GameStatus::Running);
        assert_eq!(engine.frames().pending().len(), 1);
        assert_eq!(
            tape.0.borrow().engine,
            vec![EngineSound::Start, EngineSound::Pause, EngineSound::Resume]
        );

        // A minute later: the pause gap does not count toward spawning
        engine.frames_mut().take_pending();
        engine.tick(120_000.0);
        assert_eq!(engine.state().spawn_clock.since_spawn_ms(), waited);
        assert_eq!(engine.state().obstacles.len(), 1);
        assert_eq!(engine.state().obstacles[0].rect.y(), y + 4.0);
    }

    #[test]
    fn test_pause_is_noop_when_not_running() {
        let (mut engine, tape) = engine();
        assert_eq!(engine.toggle_pause(), GameStatus::NotStarted);

        engine.start();
        engine.state_mut().place_obstacle(375.0, 420.0, 4.0);
        let mut clock = 0.0;
        pump(&mut engine, &mut clock, 1);
        assert_eq!(engine.status(), GameStatus::Over);

        assert_eq!(engine.toggle_pause(), GameStatus::Over);
        assert!(!engine.frame_pending());
        assert!(!tape.0.borrow().engine.contains(&EngineSound::Pause));
    }

    #[test]
    fn test_restart_after_over() {
        let (mut engine, _tape) = engine();
        engine.start();
        engine.state_mut().place_obstacle(0.0, 598.0, 5.0);
        engine.state_mut().place_obstacle(375.0, 420.0, 4.0);
        let mut clock = 0.0;
        pump(&mut engine, &mut clock, 1);
        assert_eq!(engine.status(), GameStatus::Over);
        assert_eq!(engine.score(), 10);

        assert!(engine.restart());
        assert_eq!(engine.status(), GameStatus::Running);
        assert_eq!(engine.score(), 0);
        assert!(engine.state().obstacles.is_empty());
        assert_eq!(engine.frames().pending().len(), 1);

        // Not while a run is active
        engine.state_mut().place_obstacle(0.0, 0.0, 3.0);
        assert!(!engine.restart());
        assert_eq!(engine.state().obstacles.len(), 1);
        engine.toggle_pause();
        assert!(!engine.restart());
    }

    #[test]
    fn test_first_frame_of_a_run_spawns() {
        let (mut engine, _tape) = engine();
        engine.start();
        engine.frames_mut().take_pending();
        let events = engine.tick(5000.0);
        assert!(matches!(events[..], [GameEvent::Spawned { .. }]));
        assert_eq!(engine.state().obstacles.len(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut engine, tape) = engine();
        engine.start();
        engine.stop();
        engine.stop();
        assert!(!engine.frame_pending());
        assert_eq!(engine.status(), GameStatus::Over);
        assert_eq!(
            tape.0.borrow().engine,
            vec![EngineSound::Start, EngineSound::Stop]
        );
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut engine, tape) = engine();
        engine.start();
        engine.state_mut().place_obstacle(100.0, 40.0, 4.0);

        engine.stop();
        assert_eq!(engine.status(), GameStatus::Over);
        assert!(engine.state().obstacles.is_empty());
        assert!(!engine.frame_pending());

        assert!(engine.restart());
        assert_eq!(engine.status(), GameStatus::Running);
        assert_eq!(engine.frames().pending().len(), 1);

        engine.toggle_pause();
        engine.toggle_pause();
        assert_eq!(
            tape.0.borrow().engine,
            vec![
                EngineSound::Start,
                EngineSound::Stop,
                EngineSound::Start,
                EngineSound::Pause,
                EngineSound::Resume
            ]
        );
    }

    #[test]
    fn test_stop_while_paused() {
        let (mut engine, tape) = engine();
        engine.start();
        engine.toggle_pause();
        engine.stop();

        assert_eq!(engine.status(), GameStatus::Over);
        assert_eq!(tape.0.borrow().engine.last(), Some(&EngineSound::Stop));
        // Nothing left to resume
        assert_eq!(engine.toggle_pause(), GameStatus::Over);
        assert!(!engine.frame_pending());
    }

    #[test]
    fn test_drop_tears_down() {
        let tape = SharedTape::default();
        let frames = SharedFrames::default();
        {
            let mut engine = Engine::new(
                GameConfig::default(),
                1,
                Recorder::new(),
                tape.clone(),
                frames.clone(),
            )
            .unwrap();
            engine.start();
            engine.toggle_pause();
            engine.toggle_pause();
            assert_eq!(frames.0.borrow().pending().len(), 1);
        }
        assert!(frames.0.borrow().pending().is_empty());
        assert_eq!(tape.0.borrow().engine.last(), Some(&EngineSound::Stop));
    }

    #[test]
    fn test_snapshot_and_autopilot() {
        let (mut engine, _tape) = engine();
        let input = engine.input();
        start_scripted(&mut engine);
        engine.state_mut().place_obstacle(375.0, -80.0, 4.0);

        input.key_down("i", false);
        assert!(engine.snapshot().autopilot);

        let mut clock = 0.0;
        pump(&mut engine, &mut clock, 200);
        assert_eq!(
            engine.snapshot(),
            HudSnapshot {
                score: 10,
                status: GameStatus::Running,
                autopilot: true,
            }
        );
    }

    #[test]
    fn test_held_keys_steer_car() {
        let (mut engine, _tape) = engine();
        let input = engine.input();
        engine.start();

        input.key_down("ArrowRight", false);
        let mut clock = 0.0;
        pump(&mut engine, &mut clock, 10);
        assert_eq!(engine.state().car.rect.x(), 425.0);

        input.key_up("ArrowRight");
        pump(&mut engine, &mut clock, 10);
        assert_eq!(engine.state().car.rect.x(), 425.0);
    }
}
