//! vidcanvas Core - Canvas Video Player Engine
//!
//! This crate provides the platform-independent player engine:
//! - Source loading, direct or through an adaptive-streaming decoder
//! - Native media event bridge feeding an observable playback snapshot
//! - Canvas render loop driven by the display refresh signal
//! - Playback, volume, mute and fullscreen control
//! - Callback-based event subscription for view bindings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        vidcanvas Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Source    │  │    Native    │  │    Render    │           │
//! │  │    Loader    │  │    Bridge    │  │     Loop     │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Player    │                              │
//! │                    │   Engine    │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │   Playback   │  │    Event    │  │   Platform   │            │
//! │  │   Snapshot   │  │   Emitter   │  │    Traits    │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The browser backend lives in `vidcanvas-wasm`.

pub mod bridge;
pub mod engine;
pub mod error;
pub mod events;
pub mod platform;
pub mod render;
pub mod source;
pub mod types;

#[cfg(test)]
mod mock;

pub use bridge::{BridgeRow, Mutation, NativeSignal, BRIDGE};
pub use engine::PlayerEngine;
pub use error::{Error, Result};
pub use events::{EventCallback, EventEmitter, EventPayload, ListenerId, PlayerEvent};
pub use platform::{
    DecoderFactory, DrawSurface, FrameCallback, FrameHandle, FrameScheduler, FullscreenHandler,
    FullscreenHost, ListenerKey, MediaElement, NativeHandler, Platform, PlayRequest, StreamDecoder,
};
pub use render::RenderLoop;
pub use source::{is_playlist_url, LoadedSource, SourceKind, PLAYLIST_EXTENSION};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "vidcanvas core initialized");
}
