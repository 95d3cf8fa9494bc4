//! `requestAnimationFrame` scheduler
//!
//! Each request owns a `Closure`. A closure cannot be dropped from inside its
//! own invocation, so fired closures are parked and reclaimed on the next
//! request or cancel.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use vidcanvas_core::{Error, FrameCallback, FrameHandle, FrameScheduler, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

pub struct AnimationFrameScheduler {
    window: Window,
    pending: Rc<RefCell<HashMap<i32, Closure<dyn FnMut(f64)>>>>,
    fired: Rc<RefCell<Vec<i32>>>,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            pending: Rc::new(RefCell::new(HashMap::new())),
            fired: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn reclaim_fired(&self) {
        let fired: Vec<i32> = self.fired.borrow_mut().drain(..).collect();
        let mut pending = self.pending.borrow_mut();
        for id in fired {
            pending.remove(&id);
        }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle> {
        self.reclaim_fired();

        let id_slot = Rc::new(Cell::new(0));
        let fired = Rc::clone(&self.fired);
        let slot = Rc::clone(&id_slot);
        let mut callback = Some(callback);
        let closure = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            if let Some(callback) = callback.take() {
                callback(timestamp);
            }
            fired.borrow_mut().push(slot.get());
        });

        let id = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| Error::Scheduler(format!("requestAnimationFrame failed: {e:?}")))?;
        id_slot.set(id);
        self.pending.borrow_mut().insert(id, closure);
        Ok(FrameHandle(id))
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0);
        self.pending.borrow_mut().remove(&handle.0);
        self.reclaim_fired();
    }
}
