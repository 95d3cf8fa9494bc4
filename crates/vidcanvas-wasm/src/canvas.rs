//! `<canvas>` drawing surface

use std::any::Any;

use vidcanvas_core::{DrawSurface, Error, MediaElement, Result};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::media::WebMedia;

/// Canvas plus its 2D context, looked up once at bind time
pub struct WebCanvas {
    canvas: HtmlCanvasElement,
    context: Option<CanvasRenderingContext2d>,
}

impl WebCanvas {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
        Self { canvas, context }
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl DrawSurface for WebCanvas {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn has_context(&self) -> bool {
        self.context.is_some()
    }

    fn clear(&self, width: f64, height: f64) {
        if let Some(ctx) = &self.context {
            ctx.clear_rect(0.0, 0.0, width, height);
        }
    }

    fn draw_frame(&self, media: &dyn MediaElement, width: f64, height: f64) -> Result<()> {
        let ctx = self.context.as_ref().ok_or(Error::DrawingContextUnavailable)?;
        let media = media
            .as_any()
            .downcast_ref::<WebMedia>()
            .ok_or_else(|| Error::Render("media element is not a <video>".to_string()))?;

        ctx.draw_image_with_html_video_element_and_dw_and_dh(media.element(), 0.0, 0.0, width, height)
            .map_err(|e| Error::Render(format!("drawImage failed: {e:?}")))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
