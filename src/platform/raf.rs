//! `requestAnimationFrame` scheduling
//!
//! One long-lived closure is registered for every frame. It is installed
//! after the game cell exists and should only hold a `Weak` to it.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

use super::{FrameHandle, FrameScheduler};

#[derive(Default)]
pub struct RafScheduler {
    callback: Option<Closure<dyn FnMut(f64)>>,
}

impl RafScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the per-frame callback
    pub fn set_callback(&mut self, callback: Closure<dyn FnMut(f64)>) {
        self.callback = Some(callback);
    }
}

impl FrameScheduler for RafScheduler {
    fn request(&mut self) -> Option<FrameHandle> {
        let Some(callback) = &self.callback else {
            log::warn!("Frame requested before callback was installed");
            return None;
        };
        let window = web_sys::window()?;
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0);
        }
    }
}
