//! Native event bridge
//!
//! Declares, row by row, which native media signal updates which snapshot
//! field and which player event it is republished as. The table is installed
//! once per engine binding and every listener it registers is removed when
//! the binding is torn down.

use crate::{
    events::{EventEmitter, EventPayload, PlayerEvent},
    platform::{ListenerKey, MediaElement},
    types::PlaybackState,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::trace;

/// Signals observed on the native media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeSignal {
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

impl NativeSignal {
    /// DOM event type
    pub fn dom_name(&self) -> &'static str {
        match self {
            NativeSignal::LoadStart => "loadstart",
            NativeSignal::LoadedMetadata => "loadedmetadata",
            NativeSignal::CanPlay => "canplay",
            NativeSignal::Play => "play",
            NativeSignal::Pause => "pause",
            NativeSignal::TimeUpdate => "timeupdate",
            NativeSignal::Progress => "progress",
            NativeSignal::VolumeChange => "volumechange",
            NativeSignal::Ended => "ended",
            NativeSignal::Error => "error",
        }
    }
}

/// Snapshot update performed before an event is republished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    None,
    Duration,
    PlaybackStarted,
    PlaybackStopped,
    CurrentTime,
    Buffered,
    Volume,
}

impl Mutation {
    /// Copy the relevant live values from `media` into `state`
    pub fn apply(&self, media: &dyn MediaElement, state: &mut PlaybackState) {
        match self {
            Mutation::None => {}
            Mutation::Duration => {
                let duration = media.duration();
                if !duration.is_nan() {
                    state.duration = duration;
                }
            }
            Mutation::PlaybackStarted => state.is_playing = true,
            Mutation::PlaybackStopped => state.is_playing = false,
            Mutation::CurrentTime => state.current_time = media.current_time(),
            Mutation::Buffered => {
                if let Some(last) = media.buffered().last() {
                    state.buffered = last.end;
                }
            }
            Mutation::Volume => {
                state.volume = media.volume();
                state.is_muted = media.muted();
            }
        }
    }
}

/// One bridge entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeRow {
    pub signal: NativeSignal,
    pub mutation: Mutation,
    pub event: PlayerEvent,
}

const fn row(signal: NativeSignal, mutation: Mutation, event: PlayerEvent) -> BridgeRow {
    BridgeRow {
        signal,
        mutation,
        event,
    }
}

/// The full native-to-player mapping
pub const BRIDGE: [BridgeRow; 10] = [
    row(NativeSignal::LoadStart, Mutation::None, PlayerEvent::LoadStart),
    row(NativeSignal::LoadedMetadata, Mutation::Duration, PlayerEvent::LoadedMetadata),
    row(NativeSignal::CanPlay, Mutation::None, PlayerEvent::CanPlay),
    row(NativeSignal::Play, Mutation::PlaybackStarted, PlayerEvent::Play),
    row(NativeSignal::Pause, Mutation::PlaybackStopped, PlayerEvent::Pause),
    row(NativeSignal::TimeUpdate, Mutation::CurrentTime, PlayerEvent::TimeUpdate),
    row(NativeSignal::Progress, Mutation::Buffered, PlayerEvent::Progress),
    row(NativeSignal::VolumeChange, Mutation::Volume, PlayerEvent::VolumeChange),
    row(NativeSignal::Ended, Mutation::PlaybackStopped, PlayerEvent::Ended),
    row(NativeSignal::Error, Mutation::None, PlayerEvent::Error),
];

/// Register every bridge row on `media`.
///
/// Handlers hold weak references only: once the engine state is gone a late
/// native signal is dropped instead of resurrecting anything.
pub(crate) fn install(
    media: &Rc<dyn MediaElement>,
    state: &Rc<RefCell<PlaybackState>>,
    emitter: &Rc<RefCell<EventEmitter>>,
) -> Vec<ListenerKey> {
    BRIDGE
        .iter()
        .map(|row| {
            let row = *row;
            let weak_media = Rc::downgrade(media);
            let weak_state = Rc::downgrade(state);
            let weak_emitter = Rc::downgrade(emitter);
            media.listen(
                row.signal,
                Box::new(move |payload| {
                    relay(row, &weak_media, &weak_state, &weak_emitter, payload.as_ref())
                }),
            )
        })
        .collect()
}

fn relay(
    row: BridgeRow,
    media: &Weak<dyn MediaElement>,
    state: &Weak<RefCell<PlaybackState>>,
    emitter: &Weak<RefCell<EventEmitter>>,
    payload: Option<&EventPayload>,
) {
    let (Some(media), Some(state), Some(emitter)) = (media.upgrade(), state.upgrade(), emitter.upgrade())
    else {
        return;
    };

    // The snapshot borrow ends before subscribers run so they can read it
    row.mutation.apply(&*media, &mut state.borrow_mut());
    trace!(signal = row.signal.dom_name(), event = %row.event, "Native signal relayed");

    EventEmitter::dispatch(&emitter, row.event, payload);
}
