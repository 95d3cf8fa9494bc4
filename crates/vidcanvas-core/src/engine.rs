//! Player Engine - owner of the media element, decoder and render loop
//!
//! Coordinates:
//! - Source loading (direct or through the streaming decoder)
//! - The native event bridge feeding the playback snapshot
//! - The canvas render loop
//! - Playback, volume and fullscreen control
//!
//! Everything runs on the UI thread. Native callbacks only hold weak
//! references to engine state, and no borrow is held while subscribers or
//! native calls run, so subscribers may call back into the engine.

use crate::{
    bridge,
    events::{EventEmitter, EventPayload, ListenerId, PlayerEvent},
    platform::{DrawSurface, ListenerKey, MediaElement, Platform, PlayRequest, StreamDecoder},
    render::RenderLoop,
    source::{self, SourceKind},
    types::{clamp_volume, format_time, EngineId, PlaybackState, PlayerOptions, VideoSize},
    Error, Result,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

/// Everything that exists only between `init()` and `destroy()`
struct Binding {
    media: Rc<dyn MediaElement>,
    canvas: Rc<dyn DrawSurface>,
    decoder: Option<Box<dyn StreamDecoder>>,
    /// `None` after a failed reload left nothing attached
    source_kind: Option<SourceKind>,
    native_listeners: Vec<ListenerKey>,
    fullscreen_listener: ListenerKey,
    render: RenderLoop,
}

/// Canvas video player engine
pub struct PlayerEngine {
    /// Unique engine ID, recorded in log events
    id: EngineId,
    /// Immutable configuration
    options: PlayerOptions,
    /// Host capabilities
    platform: Rc<dyn Platform>,
    /// Mirror of native state, written only by the engine
    state: Rc<RefCell<PlaybackState>>,
    /// Subscribers
    emitter: Rc<RefCell<EventEmitter>>,
    /// Present while initialized
    binding: RefCell<Option<Binding>>,
}

impl PlayerEngine {
    /// Create an engine. Nothing touches the platform until [`init`](Self::init).
    pub fn new(options: PlayerOptions, platform: Rc<dyn Platform>) -> Self {
        Self {
            id: EngineId::new(),
            options,
            platform,
            state: Rc::new(RefCell::new(PlaybackState::default())),
            emitter: Rc::new(RefCell::new(EventEmitter::new())),
            binding: RefCell::new(None),
        }
    }

    pub fn id(&self) -> EngineId {
        self.id
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    /// Copy of the playback snapshot
    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.binding.borrow().is_some()
    }

    /// True while a streaming decoder is attached
    pub fn has_decoder(&self) -> bool {
        self.binding
            .borrow()
            .as_ref()
            .is_some_and(|b| b.decoder.is_some())
    }

    /// How the current source is attached. `None` before `init` and after a
    /// reload that failed.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.binding.borrow().as_ref().and_then(|b| b.source_kind)
    }

    /// Frames copied onto the canvas by the current render loop
    pub fn frames_drawn(&self) -> u64 {
        self.binding
            .borrow()
            .as_ref()
            .map_or(0, |b| b.render.frames_drawn())
    }

    /// Bind a canvas, create the media element, load `src` and start
    /// rendering.
    ///
    /// Re-initializing tears the previous binding down first.
    #[instrument(skip(self, canvas), fields(engine_id = %self.id))]
    pub fn init(&self, canvas: Rc<dyn DrawSurface>, src: &str) -> Result<()> {
        if !canvas.has_context() {
            return Err(Error::DrawingContextUnavailable);
        }
        if self.is_initialized() {
            warn!("init() called on an initialized engine; releasing previous binding");
            self.teardown();
        }

        let media = self.platform.create_media()?;
        let loaded = source::load_source(&*self.platform.decoders(), &*media, src)?;
        self.configure_media(&*media);

        *self.state.borrow_mut() = PlaybackState::default();
        let native_listeners = bridge::install(&media, &self.state, &self.emitter);

        let weak_state = Rc::downgrade(&self.state);
        let id = self.id;
        let fullscreen_listener = self.platform.fullscreen().on_change(Box::new(move |active| {
            if let Some(state) = weak_state.upgrade() {
                record_fullscreen(id, &state, active);
            }
        }));

        let render = RenderLoop::new(self.platform.scheduler());
        render.start(&media, &canvas);

        info!(
            kind = ?loaded.kind,
            width = canvas.width(),
            height = canvas.height(),
            "Player initialized"
        );

        *self.binding.borrow_mut() = Some(Binding {
            media,
            canvas,
            decoder: loaded.decoder,
            source_kind: Some(loaded.kind),
            native_listeners,
            fullscreen_listener,
            render,
        });
        Ok(())
    }

    fn configure_media(&self, media: &dyn MediaElement) {
        media.set_muted(true);
        media.set_loop(self.options.loop_playback);
        media.set_preload(self.options.preload);
        media.set_attribute("playsinline", "");
        media.set_attribute("webkit-playsinline", "");
    }

    /// Swap the source on the existing media element and canvas binding.
    /// Any previous decoder is destroyed first, so a failed load leaves no
    /// source attached.
    #[instrument(skip(self), fields(engine_id = %self.id))]
    pub fn load_source(&self, src: &str) -> Result<SourceKind> {
        let (media, previous) = {
            let mut binding = self.binding.borrow_mut();
            let binding = binding.as_mut().ok_or(Error::NotInitialized)?;
            binding.source_kind = None;
            (Rc::clone(&binding.media), binding.decoder.take())
        };
        if let Some(mut decoder) = previous {
            decoder.destroy();
        }

        let loaded = match source::load_source(&*self.platform.decoders(), &*media, src) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Source load failed");
                return Err(e);
            }
        };
        let kind = loaded.kind;
        if let Some(binding) = self.binding.borrow_mut().as_mut() {
            binding.decoder = loaded.decoder;
            binding.source_kind = Some(kind);
        }

        info!(kind = ?kind, "Source loaded");
        Ok(kind)
    }

    /// Request playback.
    ///
    /// The returned request fails with [`Error::PlaybackRejected`] when the
    /// platform refuses, typically autoplay policy; callers may retry from a
    /// user gesture.
    pub fn play(&self) -> Result<PlayRequest> {
        let media = self.media()?;
        debug!(engine_id = %self.id, "Play requested");
        Ok(media.play())
    }

    pub fn pause(&self) -> Result<()> {
        let media = self.media()?;
        if !media.paused() {
            debug!(engine_id = %self.id, "Pause requested");
            media.pause();
        }
        Ok(())
    }

    /// Pause when playing, otherwise unmute if muted and start playback
    pub fn toggle_play_pause(&self) -> Result<Option<PlayRequest>> {
        let (is_playing, is_muted) = {
            let state = self.state.borrow();
            (state.is_playing, state.is_muted)
        };
        if is_playing {
            self.pause()?;
            return Ok(None);
        }
        if is_muted {
            self.unmute()?;
        }
        self.play().map(Some)
    }

    /// Jump to an absolute position in seconds. Out-of-range positions are
    /// left to the media element to clamp.
    pub fn seek(&self, time: f64) -> Result<()> {
        let media = self.media()?;
        debug!(engine_id = %self.id, time, "Seeking");
        media.set_current_time(time);
        Ok(())
    }

    /// Set the volume, clamped to `[0, 1]`. Returns the applied value.
    pub fn set_volume(&self, volume: f64) -> Result<f64> {
        let media = self.media()?;
        let applied = clamp_volume(volume);
        media.set_volume(applied);
        self.state.borrow_mut().volume = applied;
        debug!(engine_id = %self.id, requested = volume, applied, "Volume set");
        Ok(applied)
    }

    pub fn mute(&self) -> Result<()> {
        self.apply_muted(true)
    }

    pub fn unmute(&self) -> Result<()> {
        self.apply_muted(false)
    }

    pub fn toggle_mute(&self) -> Result<()> {
        let muted = self.media()?.muted();
        self.apply_muted(!muted)
    }

    /// Set the mute flag and the `muted` attribute together. Some fullscreen
    /// and autoplay policies read the attribute rather than the property.
    pub fn set_muted(&self, muted: bool) -> Result<()> {
        let media = self.media()?;
        if muted {
            media.set_attribute("muted", "");
        } else {
            media.remove_attribute("muted");
        }
        self.apply_muted(muted)
    }

    // The snapshot is updated here as well as by the volumechange bridge;
    // both write the same value.
    fn apply_muted(&self, muted: bool) -> Result<()> {
        let media = self.media()?;
        media.set_muted(muted);
        self.state.borrow_mut().is_muted = muted;
        debug!(engine_id = %self.id, muted, "Mute set");
        Ok(())
    }

    /// Ask the platform to show the canvas fullscreen
    pub fn enter_fullscreen(&self) -> Result<()> {
        let canvas = self.canvas()?;
        self.platform.fullscreen().request(&*canvas)
    }

    /// Leave fullscreen. Works whether or not the engine is initialized.
    pub fn exit_fullscreen(&self) -> Result<()> {
        self.platform.fullscreen().exit()
    }

    pub fn toggle_fullscreen(&self) -> Result<()> {
        if self.state.borrow().is_fullscreen {
            self.exit_fullscreen()
        } else {
            self.enter_fullscreen()
        }
    }

    /// Record a fullscreen change reported by the presentation environment.
    /// The platform's change signal is routed here from `init`.
    pub fn set_fullscreen(&self, active: bool) {
        record_fullscreen(self.id, &self.state, active);
    }

    /// Subscribe to a player event
    pub fn on<F>(&self, event: PlayerEvent, callback: F) -> ListenerId
    where
        F: Fn(Option<&EventPayload>) + 'static,
    {
        self.emitter.borrow_mut().on(event, callback)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.emitter.borrow_mut().off(id)
    }

    /// Invoke every subscriber of `event` synchronously
    pub fn emit(&self, event: PlayerEvent, data: Option<&EventPayload>) {
        EventEmitter::dispatch(&self.emitter, event, data);
    }

    /// Intrinsic video size, `None` until metadata has loaded
    pub fn video_size(&self) -> Option<VideoSize> {
        let media = self.media().ok()?;
        let (width, height) = (media.video_width(), media.video_height());
        (width > 0 && height > 0).then(|| VideoSize::new(width, height))
    }

    /// Format a position as `MM:SS`
    pub fn format_time(&self, seconds: f64) -> String {
        format_time(seconds)
    }

    /// Release the decoder, detach native listeners, stop the render loop
    /// and drop every subscription. Safe to call repeatedly.
    pub fn destroy(&self) {
        let was_bound = self.teardown();
        self.emitter.borrow_mut().clear();
        if was_bound {
            info!(engine_id = %self.id, "Player destroyed");
        }
    }

    fn teardown(&self) -> bool {
        let Some(mut binding) = self.binding.borrow_mut().take() else {
            return false;
        };

        binding.render.stop();
        for key in binding.native_listeners.drain(..) {
            binding.media.unlisten(key);
        }
        self.platform.fullscreen().off_change(binding.fullscreen_listener);
        if let Some(mut decoder) = binding.decoder.take() {
            decoder.destroy();
        }
        debug!(engine_id = %self.id, frames = binding.render.frames_drawn(), "Binding released");
        true
    }

    fn media(&self) -> Result<Rc<dyn MediaElement>> {
        self.binding
            .borrow()
            .as_ref()
            .map(|b| Rc::clone(&b.media))
            .ok_or(Error::NotInitialized)
    }

    fn canvas(&self) -> Result<Rc<dyn DrawSurface>> {
        self.binding
            .borrow()
            .as_ref()
            .map(|b| Rc::clone(&b.canvas))
            .ok_or(Error::NotInitialized)
    }
}

fn record_fullscreen(id: EngineId, state: &RefCell<PlaybackState>, active: bool) {
    state.borrow_mut().is_fullscreen = active;
    debug!(engine_id = %id, active, "Fullscreen changed");
}

impl Drop for PlayerEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}
