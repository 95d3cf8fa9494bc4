//! Core types for vidcanvas

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineId(pub Uuid);

impl EngineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native preload hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preload {
    #[default]
    Auto,
    Metadata,
    None,
}

impl Preload {
    /// Attribute value understood by the native media element
    pub fn as_str(&self) -> &'static str {
        match self {
            Preload::Auto => "auto",
            Preload::Metadata => "metadata",
            Preload::None => "none",
        }
    }
}

impl std::fmt::Display for Preload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Preload {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Preload::Auto),
            "metadata" => Ok(Preload::Metadata),
            "none" => Ok(Preload::None),
            other => Err(Error::InvalidConfig(format!("unknown preload value '{other}'"))),
        }
    }
}

/// Player configuration, fixed for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    /// Restart from the beginning when playback completes
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    /// Preload hint passed to the native element
    pub preload: Preload,
}

impl PlayerOptions {
    /// Parse options from a JSON object such as `{"loop": true, "preload": "metadata"}`.
    /// Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Options for short ambient clips that play on repeat
    pub fn looping() -> Self {
        Self {
            loop_playback: true,
            preload: Preload::Auto,
        }
    }

    /// Options that defer media download until playback is requested
    pub fn data_saver() -> Self {
        Self {
            loop_playback: false,
            preload: Preload::Metadata,
        }
    }
}

/// Mirror of the native media state.
///
/// Written only by the engine; everything else reads a copy via
/// [`PlayerEngine::state`](crate::PlayerEngine::state).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    /// No buffering signal drives this yet; it stays `false`.
    pub is_loading: bool,
    pub current_time: f64,
    pub duration: f64,
    /// End of the last buffered range, in seconds
    pub buffered: f64,
    pub volume: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            // Autoplay policies only allow muted playback without a gesture
            is_muted: true,
            is_fullscreen: false,
            is_loading: false,
            current_time: 0.0,
            duration: 0.0,
            buffered: 0.0,
            volume: 1.0,
        }
    }
}

impl PlaybackState {
    /// Played portion of the content (0-100)
    pub fn played_percent(&self) -> f64 {
        percent_of(self.current_time, self.duration)
    }

    /// Buffered portion of the content (0-100)
    pub fn buffered_percent(&self) -> f64 {
        percent_of(self.buffered, self.duration)
    }
}

fn percent_of(value: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    (value / duration * 100.0).clamp(0.0, 100.0)
}

/// Intrinsic video dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

impl VideoSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, `None` while either dimension is unknown
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0 && self.height > 0).then(|| self.width as f64 / self.height as f64)
    }
}

impl std::fmt::Display for VideoSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A buffered time range in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Clamp a requested volume into `[0, 1]`; NaN maps to silence.
pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

/// Format a position as `MM:SS`.
///
/// Minutes are not wrapped into hours, so an hour formats as `60:00`.
/// Negative, NaN and infinite inputs format as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
