//! Fullscreen API with vendor-prefixed fallbacks

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use vidcanvas_core::{DrawSurface, Error, FullscreenHandler, FullscreenHost, ListenerKey, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Event};

use crate::canvas::WebCanvas;

const REQUEST_METHODS: [&str; 2] = ["requestFullscreen", "webkitRequestFullscreen"];
const EXIT_METHODS: [&str; 2] = ["exitFullscreen", "webkitExitFullscreen"];
const ELEMENT_PROPERTIES: [&str; 2] = ["fullscreenElement", "webkitFullscreenElement"];
const CHANGE_EVENTS: [&str; 2] = ["fullscreenchange", "webkitfullscreenchange"];

/// Call the first method in `names` that exists on `target`
fn call_first(target: &JsValue, names: &[&str]) -> Result<()> {
    for name in names {
        let method = Reflect::get(target, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED);
        if let Some(method) = method.dyn_ref::<Function>() {
            let result = method
                .call0(target)
                .map_err(|e| Error::Fullscreen(format!("{name} threw: {e:?}")))?;
            // Rejections are reported through the change signal instead
            if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
                wasm_bindgen_futures::spawn_local(async move {
                    let _ = JsFuture::from(promise).await;
                });
            }
            return Ok(());
        }
    }
    Err(Error::Fullscreen(format!("none of {} available", names.join(", "))))
}

/// Whether any element is currently fullscreen in `document`
pub fn is_document_fullscreen(document: &Document) -> bool {
    ELEMENT_PROPERTIES.iter().any(|name| {
        Reflect::get(document, &JsValue::from_str(name))
            .map(|element| !element.is_null() && !element.is_undefined())
            .unwrap_or(false)
    })
}

type ChangeClosure = Closure<dyn FnMut(Event)>;

pub struct DocumentFullscreen {
    document: Document,
    listeners: RefCell<HashMap<u64, Vec<(&'static str, ChangeClosure)>>>,
    next_key: Cell<u64>,
}

impl DocumentFullscreen {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: RefCell::new(HashMap::new()),
            next_key: Cell::new(0),
        }
    }

    fn remove(&self, closures: Vec<(&'static str, ChangeClosure)>) {
        for (event, closure) in closures {
            let _ = self
                .document
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for DocumentFullscreen {
    fn drop(&mut self) {
        let all: Vec<_> = self.listeners.get_mut().drain().flat_map(|(_, c)| c).collect();
        self.remove(all);
    }
}

impl FullscreenHost for DocumentFullscreen {
    fn request(&self, surface: &dyn DrawSurface) -> Result<()> {
        let canvas = surface
            .as_any()
            .downcast_ref::<WebCanvas>()
            .ok_or_else(|| Error::Fullscreen("surface is not a <canvas>".to_string()))?;
        call_first(canvas.element(), &REQUEST_METHODS)
    }

    fn exit(&self) -> Result<()> {
        if !is_document_fullscreen(&self.document) {
            return Ok(());
        }
        call_first(&self.document, &EXIT_METHODS)
    }

    fn on_change(&self, handler: FullscreenHandler) -> ListenerKey {
        let handler = Rc::new(RefCell::new(handler));
        let closures = CHANGE_EVENTS
            .iter()
            .map(|event| {
                let document = self.document.clone();
                let handler = Rc::clone(&handler);
                let closure = ChangeClosure::new(move |_: Event| {
                    (handler.borrow_mut())(is_document_fullscreen(&document));
                });
                let _ = self
                    .document
                    .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
                (*event, closure)
            })
            .collect();

        let key = self.next_key.get();
        self.next_key.set(key + 1);
        self.listeners.borrow_mut().insert(key, closures);
        ListenerKey(key)
    }

    fn off_change(&self, key: ListenerKey) {
        let removed = self.listeners.borrow_mut().remove(&key.0);
        if let Some(closures) = removed {
            self.remove(closures);
        }
    }
}
