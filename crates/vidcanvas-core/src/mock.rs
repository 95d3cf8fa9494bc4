//! In-memory platform used by unit tests. Records every native call and lets
//! tests fire native signals and animation frames by hand.

use crate::{
    bridge::NativeSignal,
    platform::{
        DecoderFactory, DrawSurface, FrameCallback, FrameHandle, FrameScheduler, FullscreenHandler,
        FullscreenHost, ListenerKey, MediaElement, NativeHandler, Platform, PlayRequest,
        StreamDecoder,
    },
    Error, EventPayload, Preload, Result, TimeRange,
};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

type SharedHandler = Rc<RefCell<NativeHandler>>;

pub struct MockMedia {
    muted: Cell<bool>,
    looping: Cell<bool>,
    preload: Cell<Option<Preload>>,
    attributes: RefCell<BTreeMap<String, String>>,
    src: RefCell<Option<String>>,
    paused: Cell<bool>,
    reject_play: Cell<bool>,
    play_calls: Cell<u32>,
    pause_calls: Cell<u32>,
    current_time: Cell<f64>,
    duration: Cell<f64>,
    volume: Cell<f64>,
    size: Cell<(u32, u32)>,
    buffered: RefCell<Vec<TimeRange>>,
    handlers: RefCell<Vec<(ListenerKey, NativeSignal, SharedHandler)>>,
    next_key: Cell<u64>,
}

impl MockMedia {
    pub fn new() -> Self {
        Self {
            muted: Cell::new(false),
            looping: Cell::new(false),
            preload: Cell::new(None),
            attributes: RefCell::new(BTreeMap::new()),
            src: RefCell::new(None),
            paused: Cell::new(true),
            reject_play: Cell::new(false),
            play_calls: Cell::new(0),
            pause_calls: Cell::new(0),
            current_time: Cell::new(0.0),
            duration: Cell::new(f64::NAN),
            volume: Cell::new(1.0),
            size: Cell::new((0, 0)),
            buffered: RefCell::new(Vec::new()),
            handlers: RefCell::new(Vec::new()),
            next_key: Cell::new(0),
        }
    }

    /// Invoke every handler registered for `signal`
    pub fn fire(&self, signal: NativeSignal, payload: Option<EventPayload>) {
        let handlers: Vec<SharedHandler> = self
            .handlers
            .borrow()
            .iter()
            .filter(|(_, s, _)| *s == signal)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            (handler.borrow_mut())(payload.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn src(&self) -> Option<String> {
        self.src.borrow().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    pub fn looping(&self) -> bool {
        self.looping.get()
    }

    pub fn preload(&self) -> Option<Preload> {
        self.preload.get()
    }

    pub fn play_calls(&self) -> u32 {
        self.play_calls.get()
    }

    pub fn pause_calls(&self) -> u32 {
        self.pause_calls.get()
    }

    pub fn reject_play(&self, reject: bool) {
        self.reject_play.set(reject);
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }

    pub fn set_duration(&self, duration: f64) {
        self.duration.set(duration);
    }

    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }

    pub fn set_buffered(&self, ranges: Vec<TimeRange>) {
        *self.buffered.borrow_mut() = ranges;
    }
}

impl MediaElement for MockMedia {
    fn muted(&self) -> bool {
        self.muted.get()
    }

    fn set_muted(&self, muted: bool) {
        self.muted.set(muted);
    }

    fn set_loop(&self, looping: bool) {
        self.looping.set(looping);
    }

    fn set_preload(&self, preload: Preload) {
        self.preload.set(Some(preload));
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.borrow_mut().remove(name);
    }

    fn set_src(&self, src: &str) {
        *self.src.borrow_mut() = Some(src.to_string());
    }

    fn play(&self) -> PlayRequest {
        self.play_calls.set(self.play_calls.get() + 1);
        let result = if self.reject_play.get() {
            Err(Error::rejected("NotAllowedError: play() requires a user gesture"))
        } else {
            self.paused.set(false);
            Ok(())
        };
        Box::pin(std::future::ready(result))
    }

    fn pause(&self) {
        self.pause_calls.set(self.pause_calls.get() + 1);
        self.paused.set(true);
    }

    fn paused(&self) -> bool {
        self.paused.get()
    }

    fn current_time(&self) -> f64 {
        self.current_time.get()
    }

    fn set_current_time(&self, seconds: f64) {
        self.current_time.set(seconds);
    }

    fn duration(&self) -> f64 {
        self.duration.get()
    }

    fn volume(&self) -> f64 {
        self.volume.get()
    }

    fn set_volume(&self, volume: f64) {
        self.volume.set(volume);
    }

    fn video_width(&self) -> u32 {
        self.size.get().0
    }

    fn video_height(&self) -> u32 {
        self.size.get().1
    }

    fn buffered(&self) -> Vec<TimeRange> {
        self.buffered.borrow().clone()
    }

    fn listen(&self, signal: NativeSignal, handler: NativeHandler) -> ListenerKey {
        let key = ListenerKey(self.next_key.get());
        self.next_key.set(key.0 + 1);
        self.handlers
            .borrow_mut()
            .push((key, signal, Rc::new(RefCell::new(handler))));
        key
    }

    fn unlisten(&self, key: ListenerKey) {
        self.handlers.borrow_mut().retain(|(k, _, _)| *k != key);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockSurface {
    width: u32,
    height: u32,
    has_context: Cell<bool>,
    fail_draws: Cell<bool>,
    clears: Cell<u32>,
    last_draw: Cell<Option<(f64, f64)>>,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            has_context: Cell::new(true),
            fail_draws: Cell::new(false),
            clears: Cell::new(0),
            last_draw: Cell::new(None),
        }
    }

    pub fn without_context(width: u32, height: u32) -> Self {
        let surface = Self::new(width, height);
        surface.has_context.set(false);
        surface
    }

    pub fn fail_draws(&self, fail: bool) {
        self.fail_draws.set(fail);
    }

    pub fn clears(&self) -> u32 {
        self.clears.get()
    }

    pub fn last_draw_size(&self) -> Option<(f64, f64)> {
        self.last_draw.get()
    }
}

impl DrawSurface for MockSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn has_context(&self) -> bool {
        self.has_context.get()
    }

    fn clear(&self, _width: f64, _height: f64) {
        self.clears.set(self.clears.get() + 1);
    }

    fn draw_frame(&self, _media: &dyn MediaElement, width: f64, height: f64) -> Result<()> {
        if self.fail_draws.get() {
            return Err(Error::Render("frame not decodable".to_string()));
        }
        self.last_draw.set(Some((width, height)));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Decoder calls are logged into the factory that created them
#[derive(Clone, Default)]
struct DecoderLog {
    calls: Rc<RefCell<Vec<String>>>,
    destroyed: Rc<Cell<u32>>,
    fail_load: Rc<Cell<bool>>,
    fail_attach: Rc<Cell<bool>>,
}

struct MockDecoder {
    log: DecoderLog,
}

impl StreamDecoder for MockDecoder {
    fn load_source(&mut self, url: &str) -> Result<()> {
        if self.log.fail_load.get() {
            return Err(Error::Decoder("loadSource failed".to_string()));
        }
        self.log.calls.borrow_mut().push(format!("load:{url}"));
        Ok(())
    }

    fn attach_media(&mut self, _media: &dyn MediaElement) -> Result<()> {
        if self.log.fail_attach.get() {
            return Err(Error::Decoder("attachMedia failed".to_string()));
        }
        self.log.calls.borrow_mut().push("attach".to_string());
        Ok(())
    }

    fn destroy(&mut self) {
        self.log.destroyed.set(self.log.destroyed.get() + 1);
    }
}

pub struct MockDecoderFactory {
    supported: bool,
    created: Cell<u32>,
    log: DecoderLog,
}

impl MockDecoderFactory {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            created: Cell::new(0),
            log: DecoderLog::default(),
        }
    }

    pub fn created(&self) -> u32 {
        self.created.get()
    }

    pub fn destroyed(&self) -> u32 {
        self.log.destroyed.get()
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.calls.borrow().clone()
    }

    pub fn fail_load(&self, fail: bool) {
        self.log.fail_load.set(fail);
    }

    pub fn fail_attach(&self, fail: bool) {
        self.log.fail_attach.set(fail);
    }
}

impl DecoderFactory for MockDecoderFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self) -> Result<Box<dyn StreamDecoder>> {
        self.created.set(self.created.get() + 1);
        Ok(Box::new(MockDecoder {
            log: self.log.clone(),
        }))
    }
}

#[derive(Default)]
pub struct MockScheduler {
    pending: RefCell<Vec<(FrameHandle, FrameCallback)>>,
    next_handle: Cell<i32>,
    cancelled: Cell<u32>,
    clock: Cell<f64>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback pending at the time of the call
    pub fn run_frame(&self) {
        self.clock.set(self.clock.get() + 16.0);
        let due: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        for (_, callback) in due {
            callback(self.clock.get());
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn cancelled(&self) -> u32 {
        self.cancelled.get()
    }
}

impl FrameScheduler for MockScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle> {
        let handle = FrameHandle(self.next_handle.get() + 1);
        self.next_handle.set(handle.0);
        self.pending.borrow_mut().push((handle, callback));
        Ok(handle)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let mut pending = self.pending.borrow_mut();
        let before = pending.len();
        pending.retain(|(h, _)| *h != handle);
        if pending.len() < before {
            self.cancelled.set(self.cancelled.get() + 1);
        }
    }
}

#[derive(Default)]
pub struct MockFullscreen {
    requests: Cell<u32>,
    exits: Cell<u32>,
    unavailable: Cell<bool>,
    handlers: RefCell<Vec<(ListenerKey, Rc<RefCell<FullscreenHandler>>)>>,
    next_key: Cell<u64>,
}

impl MockFullscreen {
    pub fn requests(&self) -> u32 {
        self.requests.get()
    }

    pub fn exits(&self) -> u32 {
        self.exits.get()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Simulate the document-level change signal
    pub fn fire_change(&self, active: bool) {
        let handlers: Vec<_> = self.handlers.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            (handler.borrow_mut())(active);
        }
    }
}

impl FullscreenHost for MockFullscreen {
    fn request(&self, _surface: &dyn DrawSurface) -> Result<()> {
        if self.unavailable.get() {
            return Err(Error::Fullscreen("no fullscreen API".to_string()));
        }
        self.requests.set(self.requests.get() + 1);
        Ok(())
    }

    fn exit(&self) -> Result<()> {
        if self.unavailable.get() {
            return Err(Error::Fullscreen("no fullscreen API".to_string()));
        }
        self.exits.set(self.exits.get() + 1);
        Ok(())
    }

    fn on_change(&self, handler: FullscreenHandler) -> ListenerKey {
        let key = ListenerKey(self.next_key.get());
        self.next_key.set(key.0 + 1);
        self.handlers
            .borrow_mut()
            .push((key, Rc::new(RefCell::new(handler))));
        key
    }

    fn off_change(&self, key: ListenerKey) {
        self.handlers.borrow_mut().retain(|(k, _)| *k != key);
    }
}

pub struct MockPlatform {
    pub decoders: Rc<MockDecoderFactory>,
    pub scheduler: Rc<MockScheduler>,
    pub fullscreen: Rc<MockFullscreen>,
    media: RefCell<Vec<Rc<MockMedia>>>,
}

impl MockPlatform {
    pub fn new(decoder_supported: bool) -> Self {
        Self {
            decoders: Rc::new(MockDecoderFactory::new(decoder_supported)),
            scheduler: Rc::new(MockScheduler::new()),
            fullscreen: Rc::new(MockFullscreen::default()),
            media: RefCell::new(Vec::new()),
        }
    }

    /// Most recently created media element
    pub fn media(&self) -> Rc<MockMedia> {
        Rc::clone(self.media.borrow().last().expect("no media created yet"))
    }

    pub fn media_created(&self) -> usize {
        self.media.borrow().len()
    }
}

impl Platform for MockPlatform {
    fn create_media(&self) -> Result<Rc<dyn MediaElement>> {
        let media = Rc::new(MockMedia::new());
        self.media.borrow_mut().push(Rc::clone(&media));
        Ok(media)
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
