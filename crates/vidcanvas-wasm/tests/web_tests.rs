//! Browser tests for the WASM bindings
#![cfg(target_arch = "wasm32")]
extern crate wasm_bindgen_test;

use std::cell::Cell;
use std::rc::Rc;

use js_sys::Reflect;
use vidcanvas_wasm::{format_time, CanvasVideoPlayer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas() -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_width(320);
    canvas.set_height(180);
    canvas
}

fn error_name(err: JsValue) -> String {
    err.dyn_into::<js_sys::Error>().unwrap().name().into()
}

fn get(object: &JsValue, key: &str) -> JsValue {
    Reflect::get(object, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_player_creation() {
    assert!(CanvasVideoPlayer::new(JsValue::UNDEFINED).is_ok());
    assert!(CanvasVideoPlayer::new(JsValue::NULL).is_ok());
    assert!(CanvasVideoPlayer::looping().is_ok());
}

#[wasm_bindgen_test]
fn test_options_from_js_object() {
    let options = js_sys::Object::new();
    Reflect::set(&options, &"loop".into(), &JsValue::TRUE).unwrap();
    Reflect::set(&options, &"preload".into(), &"metadata".into()).unwrap();

    let player = CanvasVideoPlayer::new(options.into()).unwrap();
    let applied = player.options().unwrap();
    assert_eq!(get(&applied, "loop"), JsValue::TRUE);
    assert_eq!(get(&applied, "preload").as_string().as_deref(), Some("metadata"));
}

#[wasm_bindgen_test]
fn test_invalid_options_rejected() {
    let options = js_sys::Object::new();
    Reflect::set(&options, &"preload".into(), &"eager".into()).unwrap();

    let err = CanvasVideoPlayer::new(options.into()).err().unwrap();
    assert_eq!(error_name(err), "INVALID_CONFIG");
}

#[wasm_bindgen_test]
fn test_format_time() {
    let player = CanvasVideoPlayer::new(JsValue::UNDEFINED).unwrap();
    assert_eq!(player.format_time(0.0), "00:00");
    assert_eq!(player.format_time(65.4), "01:05");
    assert_eq!(format_time(f64::NAN), "00:00");
}

#[wasm_bindgen_test]
fn test_controls_before_init() {
    let player = CanvasVideoPlayer::new(JsValue::UNDEFINED).unwrap();
    assert!(!player.is_initialized());
    assert_eq!(error_name(player.play().err().unwrap()), "NOT_INITIALIZED");
    assert_eq!(error_name(player.seek(3.0).err().unwrap()), "NOT_INITIALIZED");
    assert_eq!(error_name(player.mute().err().unwrap()), "NOT_INITIALIZED");
    assert_eq!(player.get_video_size().unwrap(), JsValue::NULL);
}

#[wasm_bindgen_test]
fn test_init_binds_canvas() {
    let player = CanvasVideoPlayer::new(JsValue::UNDEFINED).unwrap();
    player.init(canvas(), "https://example.com/clip.mp4").unwrap();
    assert!(player.is_initialized());

    let state = player.state().unwrap();
    assert_eq!(get(&state, "isMuted"), JsValue::TRUE);
    assert_eq!(get(&state, "isPlaying"), JsValue::FALSE);
    assert_eq!(get(&state, "volume").as_f64(), Some(1.0));

    assert_eq!(player.set_volume(2.5).unwrap(), 1.0);
    player.unmute().unwrap();
    assert_eq!(get(&player.state().unwrap(), "isMuted"), JsValue::FALSE);
}

#[wasm_bindgen_test]
fn test_unknown_event_rejected() {
    let player = CanvasVideoPlayer::new(JsValue::UNDEFINED).unwrap();
    let callback = js_sys::Function::new_no_args("");
    let err = player.on("progressed", callback).err().unwrap();
    assert_eq!(error_name(err), "UNKNOWN_EVENT");
}

#[wasm_bindgen_test]
fn test_emit_reaches_js_subscriber() {
    let player = CanvasVideoPlayer::new(JsValue::UNDEFINED).unwrap();
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let closure = Closure::<dyn FnMut(JsValue)>::new(move |data: JsValue| {
        assert_eq!(Reflect::get(&data, &"reason".into()).unwrap().as_string().as_deref(), Some("manual"));
        seen.set(seen.get() + 1);
    });
    let id = player
        .on("pause", closure.as_ref().unchecked_ref::<js_sys::Function>().clone())
        .unwrap();

    let data = js_sys::Object::new();
    Reflect::set(&data, &"reason".into(), &"manual".into()).unwrap();
    player.emit("pause", data.into()).unwrap();
    assert_eq!(calls.get(), 1);

    assert!(player.off(id));
    assert!(!player.off(id));
    player.emit("pause", JsValue::UNDEFINED).unwrap();
    assert_eq!(calls.get(), 1);
}

#[wasm_bindgen_test]
fn test_destroy_is_idempotent() {
    let player = CanvasVideoPlayer::new(JsValue::UNDEFINED).unwrap();
    player.init(canvas(), "https://example.com/clip.mp4").unwrap();
    player.destroy();
    player.destroy();
    assert!(!player.is_initialized());
    assert_eq!(error_name(player.pause().err().unwrap()), "NOT_INITIALIZED");
}
