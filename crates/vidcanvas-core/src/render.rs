//! Render loop - copies the current video frame onto the canvas every
//! display refresh tick.
//!
//! The loop reads the media element's live frame, never the playback
//! snapshot, so it can interleave freely with event-bridge handlers. It keeps
//! repainting while paused. Draw failures are ignored for that tick.

use crate::platform::{DrawSurface, FrameHandle, FrameScheduler, MediaElement};
use std::cell::Cell;
use std::rc::{Rc, Weak};
use tracing::{trace, warn};

#[derive(Default)]
struct LoopShared {
    running: Cell<bool>,
    pending: Cell<Option<FrameHandle>>,
    frames_drawn: Cell<u64>,
}

#[derive(Clone)]
struct RenderTarget {
    media: Weak<dyn MediaElement>,
    surface: Weak<dyn DrawSurface>,
}

/// Self-rescheduling frame copier bound to one media element and surface
pub struct RenderLoop {
    scheduler: Rc<dyn FrameScheduler>,
    shared: Rc<LoopShared>,
}

impl RenderLoop {
    pub fn new(scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            scheduler,
            shared: Rc::new(LoopShared::default()),
        }
    }

    /// Draw one frame immediately, then keep drawing on every tick until
    /// [`stop`](Self::stop). Restarting a running loop retargets it.
    pub fn start(&self, media: &Rc<dyn MediaElement>, surface: &Rc<dyn DrawSurface>) {
        self.stop();
        self.shared.running.set(true);

        let target = RenderTarget {
            media: Rc::downgrade(media),
            surface: Rc::downgrade(surface),
        };
        tick(&self.scheduler, &self.shared, target);
    }

    /// Cancel the pending tick; no further frames are drawn
    pub fn stop(&self) {
        self.shared.running.set(false);
        if let Some(handle) = self.shared.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.get()
    }

    /// Frames copied onto the surface since creation
    pub fn frames_drawn(&self) -> u64 {
        self.shared.frames_drawn.get()
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tick(scheduler: &Rc<dyn FrameScheduler>, shared: &Rc<LoopShared>, target: RenderTarget) {
    if !shared.running.get() {
        return;
    }
    shared.pending.set(None);

    draw(&target, shared);

    let next_scheduler = Rc::clone(scheduler);
    let next_shared = Rc::clone(shared);
    let request = scheduler.request_frame(Box::new(move |_timestamp| {
        tick(&next_scheduler, &next_shared, target);
    }));

    match request {
        Ok(handle) => shared.pending.set(Some(handle)),
        Err(e) => {
            warn!(error = %e, "Render loop could not schedule next frame");
            shared.running.set(false);
        }
    }
}

fn draw(target: &RenderTarget, shared: &LoopShared) {
    let (Some(media), Some(surface)) = (target.media.upgrade(), target.surface.upgrade()) else {
        return;
    };
    if !surface.has_context() {
        return;
    }

    let width = surface.width() as f64;
    let height = surface.height() as f64;
    surface.clear(width, height);
    match surface.draw_frame(&*media, width, height) {
        Ok(()) => shared.frames_drawn.set(shared.frames_drawn.get() + 1),
        Err(e) => trace!(error = %e, "Frame draw skipped"),
    }
}
