//! vidcanvas WASM - browser backend for the canvas video player
//!
//! Binds the platform-agnostic engine in `vidcanvas-core` to the DOM:
//! - a detached `<video>` element for decoding
//! - hls.js (global `Hls`) for `.m3u8` playlists
//! - `requestAnimationFrame` for the render loop
//! - the Fullscreen API with `webkit` fallbacks
//!
//! ## Usage
//!
//! ```javascript
//! import init, { CanvasVideoPlayer, initLogging } from '@vidcanvas/wasm';
//!
//! await init();
//! initLogging('debug');
//!
//! const player = new CanvasVideoPlayer({ loop: true, preload: 'metadata' });
//! player.on('timeupdate', () => {
//!     const { currentTime, duration } = player.state;
//!     label.textContent = `${player.formatTime(currentTime)} / ${player.formatTime(duration)}`;
//! });
//! player.init(document.querySelector('canvas'), 'https://example.com/live/master.m3u8');
//! await player.play();
//! ```

use wasm_bindgen::prelude::*;

mod canvas;
mod fullscreen;
mod hls;
mod logging;
mod media;
mod platform;
mod player;
mod scheduler;

pub use canvas::WebCanvas;
pub use fullscreen::DocumentFullscreen;
pub use hls::{HlsDecoder, HlsFactory};
pub use logging::init_logging;
pub use media::WebMedia;
pub use platform::WebPlatform;
pub use player::CanvasVideoPlayer;
pub use scheduler::AnimationFrameScheduler;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    vidcanvas_core::init();
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Format seconds as `MM:SS` without constructing a player
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time(seconds: f64) -> String {
    vidcanvas_core::format_time(seconds)
}

/// Whether hls.js is loaded and usable in this browser
#[wasm_bindgen(js_name = isStreamingSupported)]
pub fn is_streaming_supported() -> bool {
    use vidcanvas_core::DecoderFactory;
    HlsFactory.is_supported()
}
