//! Streaming source loader
//!
//! Playlist URLs go through the adaptive-streaming decoder when the platform
//! supports it; everything else (progressive files, or playlists on hosts
//! with built-in HLS playback) is assigned straight to the media element.

use crate::{
    platform::{DecoderFactory, MediaElement, StreamDecoder},
    Result,
};
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Path suffix identifying an adaptive-streaming playlist
pub const PLAYLIST_EXTENSION: &str = ".m3u8";

/// How a source ended up attached to the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// URL assigned as the element's `src`
    Direct,
    /// URL handed to a decoder bridged to the element
    Streaming,
}

/// Result of a source load
pub struct LoadedSource {
    pub kind: SourceKind,
    pub decoder: Option<Box<dyn StreamDecoder>>,
}

impl std::fmt::Debug for LoadedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedSource")
            .field("kind", &self.kind)
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

/// True when the URL's path ends in the playlist extension.
///
/// Query strings and fragments are ignored and the comparison is
/// case-insensitive. Relative URLs are accepted.
pub fn is_playlist_url(src: &str) -> bool {
    let path = match Url::parse(src) {
        Ok(url) => url.path().to_ascii_lowercase(),
        Err(_) => {
            let end = src.find(['?', '#']).unwrap_or(src.len());
            src[..end].to_ascii_lowercase()
        }
    };
    path.ends_with(PLAYLIST_EXTENSION)
}

/// Attach `src` to `media`, creating a fresh decoder if the streaming path
/// is taken. Decoders are never reused across loads.
pub fn load_source(
    decoders: &dyn DecoderFactory,
    media: &dyn MediaElement,
    src: &str,
) -> Result<LoadedSource> {
    if is_playlist_url(src) && decoders.is_supported() {
        let mut decoder = decoders.create()?;
        let attached = decoder
            .load_source(src)
            .and_then(|()| decoder.attach_media(media));
        if let Err(e) = attached {
            decoder.destroy();
            return Err(e);
        }
        debug!(src, "Playlist attached through streaming decoder");
        return Ok(LoadedSource {
            kind: SourceKind::Streaming,
            decoder: Some(decoder),
        });
    }

    media.set_src(src);
    debug!(src, "Source assigned directly");
    Ok(LoadedSource {
        kind: SourceKind::Direct,
        decoder: None,
    })
}
