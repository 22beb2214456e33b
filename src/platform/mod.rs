//! Platform abstraction layer
//!
//! Frame scheduling: the browser hands out `requestAnimationFrame` ids, the
//! native build and the tests deliver frames by hand. Either way a pending
//! frame is identified by a [`FrameHandle`] so it can be cancelled.

#[cfg(target_arch = "wasm32")]
pub mod raf;

#[cfg(target_arch = "wasm32")]
pub use raf::RafScheduler;

/// Token of a requested, not yet delivered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Source of per-frame callbacks
pub trait FrameScheduler {
    /// Ask for one callback on the next frame. `None` if it could not be scheduled.
    fn request(&mut self) -> Option<FrameHandle>;
    /// Withdraw a pending request
    fn cancel(&mut self, handle: FrameHandle);
}

/// Scheduler whose frames are delivered by the caller
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_id: i32,
    pending: Vec<FrameHandle>,
    /// Total requests made
    pub requested: u64,
    /// Total requests withdrawn
    pub cancelled: u64,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet delivered or cancelled
    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Deliver the oldest pending frame, if any
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for ManualFrames {
    fn request(&mut self) -> Option<FrameHandle> {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        Some(handle)
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if let Some(i) = self.pending.iter().position(|h| *h == handle) {
            self.pending.remove(i);
            self.cancelled += 1;
        }
    }
}
