//! HTMLVideoElement backend for the core media trait

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use js_sys::Promise;
use vidcanvas_core::{
    Error, EventPayload, ListenerKey, MediaElement, NativeHandler, NativeSignal, PlayRequest,
    Preload, TimeRange,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlVideoElement};

struct NativeListener {
    signal: NativeSignal,
    closure: Closure<dyn FnMut(Event)>,
}

/// Detached `<video>` element used as the frame source for the canvas
pub struct WebMedia {
    video: HtmlVideoElement,
    listeners: RefCell<HashMap<u64, NativeListener>>,
    next_key: Cell<u64>,
}

impl WebMedia {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self {
            video,
            listeners: RefCell::new(HashMap::new()),
            next_key: Cell::new(0),
        }
    }

    pub fn element(&self) -> &HtmlVideoElement {
        &self.video
    }
}

impl Drop for WebMedia {
    fn drop(&mut self) {
        for (_, listener) in self.listeners.get_mut().drain() {
            let _ = self.video.remove_event_listener_with_callback(
                listener.signal.dom_name(),
                listener.closure.as_ref().unchecked_ref(),
            );
        }
    }
}

impl MediaElement for WebMedia {
    fn muted(&self) -> bool {
        self.video.muted()
    }

    fn set_muted(&self, muted: bool) {
        self.video.set_muted(muted);
    }

    fn set_loop(&self, looping: bool) {
        self.video.set_loop(looping);
    }

    fn set_preload(&self, preload: Preload) {
        self.video.set_preload(preload.as_str());
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.video.set_attribute(name, value);
    }

    fn remove_attribute(&self, name: &str) {
        let _ = self.video.remove_attribute(name);
    }

    fn set_src(&self, src: &str) {
        self.video.set_src(src);
    }

    fn play(&self) -> PlayRequest {
        let promise: Result<Promise, JsValue> = self.video.play();
        Box::pin(async move {
            let promise = promise.map_err(rejection)?;
            JsFuture::from(promise).await.map(|_| ()).map_err(rejection)
        })
    }

    fn pause(&self) {
        let _ = self.video.pause();
    }

    fn paused(&self) -> bool {
        self.video.paused()
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.video.duration()
    }

    fn volume(&self) -> f64 {
        self.video.volume()
    }

    fn set_volume(&self, volume: f64) {
        self.video.set_volume(volume);
    }

    fn video_width(&self) -> u32 {
        self.video.video_width()
    }

    fn video_height(&self) -> u32 {
        self.video.video_height()
    }

    fn buffered(&self) -> Vec<TimeRange> {
        let ranges = self.video.buffered();
        (0..ranges.length())
            .filter_map(|i| Some(TimeRange::new(ranges.start(i).ok()?, ranges.end(i).ok()?)))
            .collect()
    }

    fn listen(&self, signal: NativeSignal, mut handler: NativeHandler) -> ListenerKey {
        let video = self.video.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let payload = match signal {
                NativeSignal::Error => media_error_payload(&video),
                _ => None,
            };
            handler(payload);
        });

        if let Err(e) = self
            .video
            .add_event_listener_with_callback(signal.dom_name(), closure.as_ref().unchecked_ref())
        {
            tracing::warn!(signal = signal.dom_name(), error = ?e, "addEventListener failed");
        }

        let key = self.next_key.get();
        self.next_key.set(key + 1);
        self.listeners
            .borrow_mut()
            .insert(key, NativeListener { signal, closure });
        ListenerKey(key)
    }

    fn unlisten(&self, key: ListenerKey) {
        if let Some(listener) = self.listeners.borrow_mut().remove(&key.0) {
            let _ = self.video.remove_event_listener_with_callback(
                listener.signal.dom_name(),
                listener.closure.as_ref().unchecked_ref(),
            );
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `{code, message}` from the element's current `MediaError`
fn media_error_payload(video: &HtmlVideoElement) -> Option<EventPayload> {
    video
        .error()
        .map(|error| EventPayload::media_error(error.code(), error.message()))
}

fn rejection(value: JsValue) -> Error {
    let reason = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| format!("{}: {}", String::from(e.name()), String::from(e.message())))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));
    Error::rejected(reason)
}
