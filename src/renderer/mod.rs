//! Canvas rendering module
//!
//! The game draws nothing but filled rectangles, so the backend surface is a
//! two-call trait: clear, then fill. The browser backend is a 2D canvas
//! context; tests and the native demo record draw calls instead.

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2d;

use crate::consts::{CAR_COLOR, OBSTACLE_COLOR};
use crate::sim::{GameState, Rect};

/// CSS fill color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub &'static str);

impl Color {
    pub const CAR: Color = Color(CAR_COLOR);
    pub const OBSTACLE: Color = Color(OBSTACLE_COLOR);

    pub fn as_css(&self) -> &'static str {
        self.0
    }
}

/// Drawing surface
pub trait Canvas {
    /// Wipe the whole surface
    fn clear(&mut self, width: f32, height: f32);
    /// Fill one rectangle
    fn fill_rect(&mut self, rect: &Rect, color: Color);
}

/// Draw one frame: clear, car, then every live obstacle
pub fn draw_frame<C: Canvas + ?Sized>(canvas: &mut C, state: &GameState) {
    canvas.clear(state.config.canvas_width, state.config.canvas_height);
    canvas.fill_rect(&state.car.rect, Color::CAR);
    for obstacle in &state.obstacles {
        canvas.fill_rect(&obstacle.rect, Color::OBSTACLE);
    }
}

/// One recorded canvas call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCall {
    Clear { width: f32, height: f32 },
    Fill { rect: Rect, color: Color },
}

/// Canvas that remembers the calls of the current frame
#[derive(Debug, Default)]
pub struct Recorder {
    /// Calls since the last clear
    pub calls: Vec<DrawCall>,
    /// Number of clears seen
    pub frames: u64,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rectangles filled with `color` in the current frame
    pub fn fills(&self, color: Color) -> impl Iterator<Item = &Rect> {
        self.calls.iter().filter_map(move |call| match call {
            DrawCall::Fill { rect, color: c } if *c == color => Some(rect),
            _ => None,
        })
    }
}

impl Canvas for Recorder {
    fn clear(&mut self, width: f32, height: f32) {
        self.calls.clear();
        self.frames += 1;
        self.calls.push(DrawCall::Clear { width, height });
    }

    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        self.calls.push(DrawCall::Fill { rect: *rect, color });
    }
}
