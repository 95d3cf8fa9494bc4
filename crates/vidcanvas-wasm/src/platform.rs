//! Browser implementation of the core `Platform`

use std::rc::Rc;

use vidcanvas_core::{
    DecoderFactory, Error, FrameScheduler, FullscreenHost, MediaElement, Platform, Result,
};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlVideoElement};

use crate::fullscreen::DocumentFullscreen;
use crate::hls::HlsFactory;
use crate::media::WebMedia;
use crate::scheduler::AnimationFrameScheduler;

pub struct WebPlatform {
    document: Document,
    decoders: Rc<HlsFactory>,
    scheduler: Rc<AnimationFrameScheduler>,
    fullscreen: Rc<DocumentFullscreen>,
}

impl WebPlatform {
    /// Bind to the current window and document
    pub fn new() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| Error::MediaCreation("no window object available".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| Error::MediaCreation("no document available".to_string()))?;

        Ok(Self {
            decoders: Rc::new(HlsFactory),
            scheduler: Rc::new(AnimationFrameScheduler::new(window)),
            fullscreen: Rc::new(DocumentFullscreen::new(document.clone())),
            document,
        })
    }
}

impl Platform for WebPlatform {
    fn create_media(&self) -> Result<Rc<dyn MediaElement>> {
        // The element stays out of the DOM; frames reach the page through the canvas
        let video = self
            .document
            .create_element("video")
            .map_err(|e| Error::MediaCreation(format!("createElement failed: {e:?}")))?
            .dyn_into::<HtmlVideoElement>()
            .map_err(|_| Error::MediaCreation("element is not a <video>".to_string()))?;
        Ok(Rc::new(WebMedia::new(video)))
    }

    fn decoders(&self) -> Rc<dyn DecoderFactory> {
        self.decoders.clone()
    }

    fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        self.scheduler.clone()
    }

    fn fullscreen(&self) -> Rc<dyn FullscreenHost> {
        self.fullscreen.clone()
    }
}
