//! Player events and the subscriber registry
//!
//! The catalog is closed: ten events, each with a stable string name that
//! view bindings subscribe with. Only `error` carries a payload when it comes
//! from the media element.

use crate::{Error, Result};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Events republished by the player engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerEvent {
    LoadStart,
    LoadedMetadata,
    CanPlay,
    Play,
    Pause,
    TimeUpdate,
    Progress,
    VolumeChange,
    Ended,
    Error,
}

impl PlayerEvent {
    /// Every event in catalog order
    pub const ALL: [PlayerEvent; 10] = [
        PlayerEvent::LoadStart,
        PlayerEvent::LoadedMetadata,
        PlayerEvent::CanPlay,
        PlayerEvent::Play,
        PlayerEvent::Pause,
        PlayerEvent::TimeUpdate,
        PlayerEvent::Progress,
        PlayerEvent::VolumeChange,
        PlayerEvent::Ended,
        PlayerEvent::Error,
    ];

    /// Name used by subscribers
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEvent::LoadStart => "loadstart",
            PlayerEvent::LoadedMetadata => "loadedmetadata",
            PlayerEvent::CanPlay => "canplay",
            PlayerEvent::Play => "play",
            PlayerEvent::Pause => "pause",
            PlayerEvent::TimeUpdate => "timeupdate",
            PlayerEvent::Progress => "progress",
            PlayerEvent::VolumeChange => "volumechange",
            PlayerEvent::Ended => "ended",
            PlayerEvent::Error => "error",
        }
    }
}

impl std::fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayerEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PlayerEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_string()))
    }
}

/// Data attached to an emitted event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    /// Error reported by the native media element
    MediaError { code: u16, message: String },
    /// Arbitrary data passed to a manual `emit`
    Json(serde_json::Value),
}

impl EventPayload {
    pub fn media_error(code: u16, message: impl Into<String>) -> Self {
        EventPayload::MediaError {
            code,
            message: message.into(),
        }
    }
}

/// Subscriber callback
pub type EventCallback = Rc<dyn Fn(Option<&EventPayload>)>;

/// Handle returned by [`EventEmitter::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

struct Listener {
    id: ListenerId,
    callback: EventCallback,
}

/// Minimal publish/subscribe registry keyed by [`PlayerEvent`]
#[derive(Default)]
pub struct EventEmitter {
    listeners: HashMap<PlayerEvent, Vec<Listener>>,
    next_id: u64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to an event. Callbacks run in subscription order.
    pub fn on<F>(&mut self, event: PlayerEvent, callback: F) -> ListenerId
    where
        F: Fn(Option<&EventPayload>) + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry(event).or_default().push(Listener {
            id,
            callback: Rc::new(callback),
        });
        id
    }

    /// Remove a single subscription. Returns false if it was already gone.
    pub fn off(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(pos) = listeners.iter().position(|l| l.id == id) {
                listeners.remove(pos);
                return true;
            }
        }
        false
    }

    /// Callbacks currently subscribed to `event`, in order
    pub fn listeners(&self, event: PlayerEvent) -> Vec<EventCallback> {
        self.listeners
            .get(&event)
            .map(|listeners| listeners.iter().map(|l| Rc::clone(&l.callback)).collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self, event: PlayerEvent) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.values().all(Vec::is_empty)
    }

    /// Invoke every subscriber of `event`. No-op without subscribers.
    pub fn emit(&self, event: PlayerEvent, data: Option<&EventPayload>) {
        for callback in self.listeners(event) {
            callback(data);
        }
    }

    /// Emit through a shared emitter without holding its borrow while
    /// callbacks run, so callbacks may subscribe or unsubscribe.
    pub fn dispatch(emitter: &RefCell<Self>, event: PlayerEvent, data: Option<&EventPayload>) {
        let callbacks = emitter.borrow().listeners(event);
        for callback in callbacks {
            callback(data);
        }
    }

    /// Drop every subscription
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
