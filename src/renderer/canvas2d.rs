//! Browser backend: `CanvasRenderingContext2d`

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Canvas, Color};
use crate::sim::Rect;

pub struct Canvas2d {
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    /// Grab the 2D context of a canvas element
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { ctx })
    }
}

impl Canvas for Canvas2d {
    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        self.ctx.set_fill_style_str(color.as_css());
        self.ctx.fill_rect(
            rect.x() as f64,
            rect.y() as f64,
            rect.width() as f64,
            rect.height() as f64,
        );
    }
}
