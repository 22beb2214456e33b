//! Keyboard input
//!
//! Key handlers and the frame loop share one [`InputState`]. Every key event
//! replaces exactly one flag, so a handler firing between frames can never
//! leave the loop looking at a half-applied update.

use std::sync::atomic::{AtomicBool, Ordering};

/// Keys the game responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Space: pause/resume
    Pause,
    /// Enter: start or play again
    Confirm,
    /// `i`: toggle demo mode
    Autopilot,
    /// `m`: toggle mute
    Mute,
}

impl Key {
    /// Map a `KeyboardEvent.key` value; unknown keys map to `None`
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            " " => Some(Key::Pause),
            "Enter" => Some(Key::Confirm),
            "i" | "I" => Some(Key::Autopilot),
            "m" | "M" => Some(Key::Mute),
            _ => None,
        }
    }

    pub fn is_direction(&self) -> bool {
        matches!(self, Key::Left | Key::Right | Key::Up | Key::Down)
    }
}

/// Commands a key press asks the shell to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Start,
    ToggleMute,
}

/// Input flags for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Demo mode - steering comes from the autopilot
    pub autopilot: bool,
}

/// Held keys, written by key handlers and read once per tick
#[derive(Debug, Default)]
pub struct InputState {
    left: AtomicBool,
    right: AtomicBool,
    up: AtomicBool,
    down: AtomicBool,
    autopilot: AtomicBool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, key: Key) -> Option<&AtomicBool> {
        match key {
            Key::Left => Some(&self.left),
            Key::Right => Some(&self.right),
            Key::Up => Some(&self.up),
            Key::Down => Some(&self.down),
            _ => None,
        }
    }

    /// Set or clear one directional flag; other keys are ignored
    pub fn set_held(&self, key: Key, held: bool) {
        if let Some(flag) = self.flag(key) {
            flag.store(held, Ordering::Relaxed);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.flag(key).is_some_and(|f| f.load(Ordering::Relaxed))
    }

    /// Flip demo mode, returning the new value
    pub fn toggle_autopilot(&self) -> bool {
        !self.autopilot.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot.load(Ordering::Relaxed)
    }

    /// Drop all held directions (focus lost, new run)
    pub fn release_all(&self) {
        for flag in [&self.left, &self.right, &self.up, &self.down] {
            flag.store(false, Ordering::Relaxed);
        }
    }

    /// Handle a key-down. `repeat` is the browser's auto-repeat flag.
    pub fn key_down(&self, key: &str, repeat: bool) -> Option<Command> {
        let key = Key::from_key(key)?;
        if key.is_direction() {
            self.set_held(key, true);
            return None;
        }
        if repeat {
            return None;
        }
        match key {
            Key::Pause => Some(Command::TogglePause),
            Key::Confirm => Some(Command::Start),
            Key::Mute => Some(Command::ToggleMute),
            Key::Autopilot => {
                let on = self.toggle_autopilot();
                log::info!("Autopilot: {}", on);
                None
            }
            _ => None,
        }
    }

    /// Handle a key-up
    pub fn key_up(&self, key: &str) {
        if let Some(key) = Key::from_key(key) {
            self.set_held(key, false);
        }
    }

    /// Copy every flag for one tick
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            left: self.is_held(Key::Left),
            right: self.is_held(Key::Right),
            up: self.is_held(Key::Up),
            down: self.is_held(Key::Down),
            autopilot: self.autopilot(),
        }
    }
}
