//! Car Dodge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use car_dodge::audio::WebAudio;
    use car_dodge::platform::RafScheduler;
    use car_dodge::renderer::Canvas2d;
    use car_dodge::sim::{Command, GameStatus, InputState, Key};
    use car_dodge::{Engine, GameConfig, HudSnapshot, Settings};

    type WebEngine = Engine<Canvas2d, WebAudio, RafScheduler>;

    /// Game instance holding all state
    struct Game {
        engine: WebEngine,
        settings: Settings,
        document: Document,
        /// Last HUD state written to the DOM
        shown: Option<HudSnapshot>,
    }

    impl Game {
        fn on_frame(&mut self, time: f64) {
            self.engine.tick(time);
            self.update_hud();
        }

        fn start(&mut self) {
            if self.engine.restart() {
                self.update_hud();
            }
        }

        fn toggle_pause(&mut self) {
            self.engine.toggle_pause();
            self.update_hud();
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_muted();
            self.engine.audio_mut().set_muted(muted);
            self.settings.save();
            log::info!("Muted: {}", muted);
        }

        fn run_command(&mut self, command: Command) {
            match command {
                Command::TogglePause => self.toggle_pause(),
                Command::Start => self.start(),
                Command::ToggleMute => self.toggle_mute(),
            }
        }

        /// Pause a running game (tab hidden, focus lost)
        fn auto_pause(&mut self, reason: &str) {
            if self.settings.auto_pause && self.engine.status() == GameStatus::Running {
                self.toggle_pause();
                log::info!("Auto-paused ({})", reason);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let hud = self.engine.snapshot();
            if self.shown == Some(hud) {
                return;
            }
            self.shown = Some(hud);

            let doc = &self.document;

            if let Some(el) = doc.get_element_by_id("score") {
                el.set_text_content(Some(&format!("Score: {}", hud.score)));
            }

            if let Some(el) = doc.get_element_by_id("pause-btn") {
                let label = if hud.status == GameStatus::Paused {
                    "Resume"
                } else {
                    "Pause"
                };
                el.set_text_content(Some(label));
            }

            if let Some(el) = doc.get_element_by_id("autopilot") {
                let _ = el.class_list().toggle_with_force("hidden", !hud.autopilot);
            }

            // Title / game over overlay
            let (show, title, button) = match hud.status {
                GameStatus::NotStarted => (true, "Car Racing Game", "Start Game"),
                GameStatus::Over => (true, "Game Over!", "Play Again"),
                GameStatus::Running | GameStatus::Paused => (false, "", ""),
            };
            if let Some(el) = doc.get_element_by_id("overlay") {
                let _ = el.class_list().toggle_with_force("hidden", !show);
            }
            if show {
                if let Some(el) = doc.get_element_by_id("overlay-title") {
                    el.set_text_content(Some(title));
                }
                if let Some(el) = doc.get_element_by_id("overlay-score") {
                    el.set_text_content(Some(&format!("Score: {}", hud.score)));
                }
                if let Some(el) = doc.get_element_by_id("start-btn") {
                    el.set_text_content(Some(button));
                }
            }
        }
    }

    /// Pick the game config: `data-config` JSON on the canvas, else the
    /// canvas size, else the defaults
    fn load_config(canvas: &HtmlCanvasElement) -> GameConfig {
        if let Some(json) = canvas.get_attribute("data-config") {
            match GameConfig::from_json(&json) {
                Ok(config) => return config,
                Err(e) => log::error!("Ignoring data-config: {}", e),
            }
        }

        let sized = GameConfig::with_canvas(canvas.width() as f32, canvas.height() as f32);
        match sized.validate() {
            Ok(()) => sized,
            Err(e) => {
                log::error!(
                    "Canvas {}x{} unusable ({}), using defaults",
                    canvas.width(),
                    canvas.height(),
                    e
                );
                GameConfig::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Car Dodge starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let config = load_config(&canvas);
        canvas.set_width(config.canvas_width as u32);
        canvas.set_height(config.canvas_height as u32);

        let Some(surface) = Canvas2d::from_canvas(&canvas) else {
            log::error!("2D canvas context unavailable");
            return;
        };

        let settings = Settings::load();
        let mut audio = WebAudio::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_muted(settings.muted);

        let seed = js_sys::Date::now() as u64;
        let engine = match Engine::new(config, seed, surface, audio, RafScheduler::new()) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Cannot start engine: {}", e);
                return;
            }
        };
        let input = engine.input();

        let game = Rc::new(RefCell::new(Game {
            engine,
            settings,
            document: document.clone(),
            shown: None,
        }));

        log::info!("Game initialized with seed: {}", seed);

        // The frame callback lives inside the engine, so it must not own the game
        {
            let weak: Weak<RefCell<Game>> = Rc::downgrade(&game);
            let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                if let Some(game) = weak.upgrade() {
                    game.borrow_mut().on_frame(time);
                }
            });
            game.borrow_mut()
                .engine
                .frames_mut()
                .set_callback(closure);
        }

        setup_keyboard(&window, input.clone(), game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(&window, &document, input, game.clone());
        setup_teardown(&window, game.clone());

        game.borrow_mut().update_hud();

        log::info!("Car Dodge ready!");
    }

    fn setup_keyboard(window: &web_sys::Window, input: Rc<InputState>, game: Rc<RefCell<Game>>) {
        // Key down: held flags go straight to the shared input state
        {
            let input = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if Key::from_key(&key).is_none() {
                    return;
                }
                // Keep arrows and space from scrolling the page
                event.prevent_default();
                if let Some(command) = input.key_down(&key, event.repeat()) {
                    game.borrow_mut().run_command(command);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                input.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        // Start Game / Play Again
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("No #start-btn element");
        }

        // Pause / Resume
        if let Some(btn) = document.get_element_by_id("pause-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().toggle_pause();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("No #pause-btn element");
        }
    }

    fn setup_auto_pause(
        window: &web_sys::Window,
        document: &Document,
        input: Rc<InputState>,
        game: Rc<RefCell<Game>>,
    ) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().auto_pause("tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside). Key-ups are lost while unfocused.
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                input.release_all();
                game.borrow_mut().auto_pause("window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Page going away: cancel the frame loop and silence the engine
    fn setup_teardown(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut game = game.borrow_mut();
            game.engine.stop();
            // Shown as game over if the page comes back from the cache
            game.update_hud();
            log::info!("Page hidden - game loop stopped");
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Car Dodge (native) starting...");
    log::info!("Native mode runs a headless autopilot session - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(12345);
    run_headless(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Let the autopilot play two minutes of 60 Hz frames
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(seed: u64) {
    use car_dodge::audio::SilentAudio;
    use car_dodge::platform::ManualFrames;
    use car_dodge::renderer::Recorder;
    use car_dodge::{Engine, GameConfig};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u64 = 60 * 120;

    let mut engine = match Engine::new(
        GameConfig::default(),
        seed,
        Recorder::new(),
        SilentAudio,
        ManualFrames::new(),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Invalid config: {}", e);
            return;
        }
    };

    engine.input().toggle_autopilot();
    engine.start();

    let mut clock = 0.0;
    let mut frames = 0;
    while frames < MAX_FRAMES && engine.frames_mut().take_pending().is_some() {
        clock += FRAME_MS;
        engine.tick(clock);
        frames += 1;
    }
    engine.stop();

    let hud = engine.snapshot();
    println!(
        "seed {}: {} frames, score {}, status {}",
        seed,
        frames,
        hud.score,
        hud.status.as_str()
    );
}
