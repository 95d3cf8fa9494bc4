//! `CanvasVideoPlayer` - the JavaScript-facing player

use std::rc::Rc;

use serde::Serialize;
use tracing::debug;
use vidcanvas_core::{Error, EventPayload, ListenerId, PlayerEngine, PlayerEvent, PlayerOptions};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlCanvasElement;

use crate::canvas::WebCanvas;
use crate::platform::WebPlatform;

/// Convert a core error into a JS `Error` whose `name` is the error code
pub(crate) fn to_js_error(err: Error) -> JsValue {
    let js = js_sys::Error::new(&err.to_string());
    js.set_name(err.error_code());
    js.into()
}

/// Serialize through the JSON-compatible serializer so maps become plain objects
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| to_js_error(Error::InvalidConfig(e.to_string())))
}

fn parse_event(event: &str) -> Result<PlayerEvent, JsValue> {
    event.parse().map_err(to_js_error)
}

/// Video player that renders every frame onto a `<canvas>`
#[wasm_bindgen]
pub struct CanvasVideoPlayer {
    engine: PlayerEngine,
}

impl CanvasVideoPlayer {
    fn with_options(options: PlayerOptions) -> Result<CanvasVideoPlayer, JsValue> {
        let platform = WebPlatform::new().map_err(to_js_error)?;
        let engine = PlayerEngine::new(options, Rc::new(platform));
        debug!(engine_id = %engine.id(), "CanvasVideoPlayer created");
        Ok(Self { engine })
    }

    /// Underlying engine, for Rust callers embedding the player
    pub fn engine(&self) -> &PlayerEngine {
        &self.engine
    }
}

#[wasm_bindgen]
impl CanvasVideoPlayer {
    /// Create a player. `options` may be omitted or `{ loop, preload }`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<CanvasVideoPlayer, JsValue> {
        let options = if options.is_undefined() || options.is_null() {
            PlayerOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| to_js_error(Error::InvalidConfig(e.to_string())))?
        };
        Self::with_options(options)
    }

    /// Options preset for short clips played on repeat
    #[wasm_bindgen(js_name = looping)]
    pub fn looping() -> Result<CanvasVideoPlayer, JsValue> {
        Self::with_options(PlayerOptions::looping())
    }

    /// Options preset that defers downloading until playback starts
    #[wasm_bindgen(js_name = dataSaver)]
    pub fn data_saver() -> Result<CanvasVideoPlayer, JsValue> {
        Self::with_options(PlayerOptions::data_saver())
    }

    /// Bind to `canvas` and start loading `src`
    pub fn init(&self, canvas: HtmlCanvasElement, src: &str) -> Result<(), JsValue> {
        self.engine
            .init(Rc::new(WebCanvas::new(canvas)), src)
            .map_err(to_js_error)
    }

    /// Switch to a new source on the bound element
    #[wasm_bindgen(js_name = loadSource)]
    pub fn load_source(&self, src: &str) -> Result<(), JsValue> {
        self.engine.load_source(src).map(|_| ()).map_err(to_js_error)
    }

    /// Start playback. The promise rejects when the browser refuses to play.
    pub fn play(&self) -> Result<js_sys::Promise, JsValue> {
        let request = self.engine.play().map_err(to_js_error)?;
        Ok(future_to_promise(async move {
            request.await.map(|_| JsValue::UNDEFINED).map_err(to_js_error)
        }))
    }

    pub fn pause(&self) -> Result<(), JsValue> {
        self.engine.pause().map_err(to_js_error)
    }

    /// Returns the play promise when playback was requested, `undefined` otherwise
    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) -> Result<JsValue, JsValue> {
        match self.engine.toggle_play_pause().map_err(to_js_error)? {
            Some(request) => Ok(future_to_promise(async move {
                request.await.map(|_| JsValue::UNDEFINED).map_err(to_js_error)
            })
            .into()),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn seek(&self, time: f64) -> Result<(), JsValue> {
        self.engine.seek(time).map_err(to_js_error)
    }

    /// Returns the volume actually applied after clamping to `[0, 1]`
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) -> Result<f64, JsValue> {
        self.engine.set_volume(volume).map_err(to_js_error)
    }

    pub fn mute(&self) -> Result<(), JsValue> {
        self.engine.mute().map_err(to_js_error)
    }

    pub fn unmute(&self) -> Result<(), JsValue> {
        self.engine.unmute().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) -> Result<(), JsValue> {
        self.engine.toggle_mute().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) -> Result<(), JsValue> {
        self.engine.set_muted(muted).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = enterFullscreen)]
    pub fn enter_fullscreen(&self) -> Result<(), JsValue> {
        self.engine.enter_fullscreen().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = exitFullscreen)]
    pub fn exit_fullscreen(&self) -> Result<(), JsValue> {
        self.engine.exit_fullscreen().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) -> Result<(), JsValue> {
        self.engine.toggle_fullscreen().map_err(to_js_error)
    }

    /// Subscribe `callback` to `event`. Returns an id for `off`.
    pub fn on(&self, event: &str, callback: js_sys::Function) -> Result<f64, JsValue> {
        let event = parse_event(event)?;
        let id = self.engine.on(event, move |data: Option<&EventPayload>| {
            let arg = match data {
                Some(payload) => to_js(payload).unwrap_or(JsValue::UNDEFINED),
                None => JsValue::UNDEFINED,
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
                web_sys::console::error_2(&"vidcanvas: event listener threw".into(), &e);
            }
        });
        Ok(id.0 as f64)
    }

    /// Remove a subscription. Returns false when the id is unknown.
    pub fn off(&self, id: f64) -> bool {
        if !(id.is_finite() && id >= 0.0) {
            return false;
        }
        self.engine.off(ListenerId(id as u64))
    }

    /// Dispatch `event` to its subscribers with optional JSON-compatible `data`
    pub fn emit(&self, event: &str, data: JsValue) -> Result<(), JsValue> {
        let event = parse_event(event)?;
        let payload = if data.is_undefined() {
            None
        } else {
            let value: serde_json::Value = serde_wasm_bindgen::from_value(data)
                .map_err(|e| to_js_error(Error::InvalidConfig(e.to_string())))?;
            Some(EventPayload::Json(value))
        };
        self.engine.emit(event, payload.as_ref());
        Ok(())
    }

    /// Release the decoder, listeners and render loop. Safe to call twice.
    pub fn destroy(&self) {
        self.engine.destroy();
    }

    /// Format seconds as `MM:SS`
    #[wasm_bindgen(js_name = formatTime)]
    pub fn format_time(&self, seconds: f64) -> String {
        self.engine.format_time(seconds)
    }

    /// `{ width, height }` once metadata has loaded, otherwise `null`
    #[wasm_bindgen(js_name = getVideoSize)]
    pub fn get_video_size(&self) -> Result<JsValue, JsValue> {
        match self.engine.video_size() {
            Some(size) => to_js(&size),
            None => Ok(JsValue::NULL),
        }
    }

    /// Snapshot of the playback state
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.state())
    }

    #[wasm_bindgen(getter)]
    pub fn options(&self) -> Result<JsValue, JsValue> {
        to_js(self.engine.options())
    }

    #[wasm_bindgen(getter, js_name = isInitialized)]
    pub fn is_initialized(&self) -> bool {
        self.engine.is_initialized()
    }

    #[wasm_bindgen(getter, js_name = engineId)]
    pub fn engine_id(&self) -> String {
        self.engine.id().to_string()
    }
}
