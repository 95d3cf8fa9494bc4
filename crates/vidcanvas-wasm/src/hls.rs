//! hls.js bindings
//!
//! hls.js is expected as the global `Hls` (script tag or bundler global).
//! Without it every playlist falls back to direct assignment, which covers
//! browsers with built-in HLS playback.

use vidcanvas_core::{DecoderFactory, Error, MediaElement, Result, StreamDecoder};
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

use crate::media::WebMedia;

#[wasm_bindgen]
extern "C" {
    type Hls;

    #[wasm_bindgen(catch, constructor)]
    fn new() -> std::result::Result<Hls, JsValue>;

    #[wasm_bindgen(catch, static_method_of = Hls, js_name = isSupported)]
    fn is_supported() -> std::result::Result<bool, JsValue>;

    #[wasm_bindgen(catch, method, js_name = loadSource)]
    fn load_source(this: &Hls, url: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch, method, js_name = attachMedia)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);
}

fn hls_global_present() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("Hls")).unwrap_or(false)
}

/// Creates hls.js instances
#[derive(Debug, Default, Clone, Copy)]
pub struct HlsFactory;

impl DecoderFactory for HlsFactory {
    fn is_supported(&self) -> bool {
        hls_global_present() && Hls::is_supported().unwrap_or(false)
    }

    fn create(&self) -> Result<Box<dyn StreamDecoder>> {
        let hls = Hls::new().map_err(|e| Error::Decoder(format!("new Hls() failed: {e:?}")))?;
        Ok(Box::new(HlsDecoder { hls: Some(hls) }))
    }
}

/// One hls.js instance, bridged to a single `<video>`
pub struct HlsDecoder {
    hls: Option<Hls>,
}

impl HlsDecoder {
    fn instance(&self) -> Result<&Hls> {
        self.hls
            .as_ref()
            .ok_or_else(|| Error::Decoder("hls.js instance already destroyed".to_string()))
    }
}

impl StreamDecoder for HlsDecoder {
    fn load_source(&mut self, url: &str) -> Result<()> {
        self.instance()?
            .load_source(url)
            .map_err(|e| Error::Decoder(format!("loadSource failed: {e:?}")))
    }

    fn attach_media(&mut self, media: &dyn MediaElement) -> Result<()> {
        let media = media
            .as_any()
            .downcast_ref::<WebMedia>()
            .ok_or_else(|| Error::Decoder("hls.js can only attach to a <video> element".to_string()))?;
        self.instance()?
            .attach_media(media.element())
            .map_err(|e| Error::Decoder(format!("attachMedia failed: {e:?}")))
    }

    fn destroy(&mut self) {
        if let Some(hls) = self.hls.take() {
            hls.destroy();
        }
    }
}

impl Drop for HlsDecoder {
    fn drop(&mut self) {
        self.destroy();
    }
}
