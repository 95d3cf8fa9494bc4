//! Host capabilities consumed by the engine
//!
//! The engine never touches a DOM directly. A backend (the browser one lives
//! in `vidcanvas-wasm`) implements these traits over the real media element,
//! canvas, animation-frame scheduler, fullscreen API and streaming decoder.
//!
//! All callbacks are delivered on the single UI thread, so nothing here is
//! `Send`.

use crate::{bridge::NativeSignal, EventPayload, Preload, Result, TimeRange};
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Completion of a native play request
pub type PlayRequest = Pin<Box<dyn Future<Output = Result<()>>>>;

/// Handler for one native media signal. Receives a payload for `error` only.
pub type NativeHandler = Box<dyn FnMut(Option<EventPayload>)>;

/// Callback for one display refresh tick, given the frame timestamp in ms
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Handler for the document-level fullscreen change signal
pub type FullscreenHandler = Box<dyn FnMut(bool)>;

/// Registration handle for a native listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey(pub u64);

/// Pending display refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// The platform's playable media object
pub trait MediaElement {
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    fn set_loop(&self, looping: bool);
    fn set_preload(&self, preload: Preload);
    fn set_attribute(&self, name: &str, value: &str);
    fn remove_attribute(&self, name: &str);
    fn set_src(&self, src: &str);

    /// Request playback. The future fails when the platform refuses,
    /// e.g. autoplay policy or no playable source.
    fn play(&self) -> PlayRequest;
    fn pause(&self);
    fn paused(&self) -> bool;

    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// NaN until metadata is known, infinite for live streams
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    /// 0 until metadata is known
    fn video_width(&self) -> u32;
    fn video_height(&self) -> u32;
    fn buffered(&self) -> Vec<TimeRange>;

    fn listen(&self, signal: NativeSignal, handler: NativeHandler) -> ListenerKey;
    fn unlisten(&self, key: ListenerKey);

    /// Lets a backend's decoder or surface reach its concrete element
    fn as_any(&self) -> &dyn Any;
}

/// Raster surface frames are copied onto
pub trait DrawSurface {
    /// Pixel width of the drawable region
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn has_context(&self) -> bool;
    fn clear(&self, width: f64, height: f64);
    /// Draw the media's current frame scaled to `width` x `height`
    fn draw_frame(&self, media: &dyn MediaElement, width: f64, height: f64) -> Result<()>;
    fn as_any(&self) -> &dyn Any;
}

/// An adaptive-streaming decoder instance (hls.js in the browser)
pub trait StreamDecoder {
    fn load_source(&mut self, url: &str) -> Result<()>;
    fn attach_media(&mut self, media: &dyn MediaElement) -> Result<()>;
    /// Release the decoder. Called at most once per instance.
    fn destroy(&mut self);
}

/// Creates decoder instances and reports platform support
pub trait DecoderFactory {
    fn is_supported(&self) -> bool;
    fn create(&self) -> Result<Box<dyn StreamDecoder>>;
}

/// Display-refresh scheduling primitive
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle>;
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Platform fullscreen API
pub trait FullscreenHost {
    /// Ask the platform to show `surface` fullscreen. Success is reported
    /// later through the change signal, not here.
    fn request(&self, surface: &dyn DrawSurface) -> Result<()>;
    fn exit(&self) -> Result<()>;
    fn on_change(&self, handler: FullscreenHandler) -> ListenerKey;
    fn off_change(&self, key: ListenerKey);
}

/// Bundle of host capabilities handed to the engine at construction
pub trait Platform {
    fn create_media(&self) -> Result<Rc<dyn MediaElement>>;
    fn decoders(&self) -> Rc<dyn DecoderFactory>;
    fn scheduler(&self) -> Rc<dyn FrameScheduler>;
    fn fullscreen(&self) -> Rc<dyn FullscreenHost>;
}
