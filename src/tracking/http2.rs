//! Per-session accumulator of synthesized HTTP/2 frames.
//!
//! Frames are not read off the wire. A tracker is seeded with its
//! profile family's SETTINGS and WINDOW_UPDATE preset and the session
//! records one HEADERS frame per outbound request.

use parking_lot::RwLock;

use crate::fingerprint::http2::{Frame, FrameFlag, FrameType, HeaderPriority, Http2Settings, Settings};
use crate::fingerprint::profiles::{BrowserFamily, Profile};

/// Weight given to the priority derived from a HEADERS frame.
pub const SYNTHETIC_PRIORITY_WEIGHT: u8 = 16;

/// Per-header overhead used by [`estimate_headers_size`].
const HEADER_LINE_OVERHEAD: usize = 4;

/// Aggregate tracker state read under a single lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Http2Snapshot {
    pub settings: Settings,
    pub window_size: u32,
    pub priority: Option<HeaderPriority>,
    pub frames: Vec<Frame>,
}

#[derive(Default)]
struct State {
    frames: Vec<Frame>,
    settings: Settings,
    window_size: u32,
    priority: Option<HeaderPriority>,
}

/// Frame accumulator owned by one client session.
#[derive(Default)]
pub struct Http2Tracker {
    state: RwLock<State>,
}

impl std::fmt::Debug for Http2Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Http2Tracker")
            .field("frames", &state.frames.len())
            .field("window_size", &state.window_size)
            .finish()
    }
}

impl Http2Tracker {
    /// An empty tracker with no preset frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker seeded with `preset`'s SETTINGS and WINDOW_UPDATE frames.
    pub fn with_preset(preset: &Http2Settings) -> Self {
        let tracker = Self::new();
        for frame in preset.initial_frames() {
            tracker.track_frame(frame);
        }
        tracker
    }

    pub fn for_profile(profile: &Profile) -> Self {
        Self::with_preset(&profile.family.http2_settings())
    }

    /// Seed by profile name; unknown names get the Chromium preset.
    pub fn for_profile_name(name: &str) -> Self {
        Self::with_preset(&BrowserFamily::for_profile_name(name).http2_settings())
    }

    /// Record a frame and fold it into the aggregate state.
    pub fn track_frame(&self, frame: Frame) {
        tracing::trace!(
            frame_type = ?frame.frame_type,
            stream_id = frame.stream_id,
            length = frame.length,
            "tracking HTTP/2 frame"
        );
        let mut state = self.state.write();
        match frame.frame_type {
            FrameType::Settings => {
                for (id, value) in &frame.settings {
                    state.settings.insert(*id, *value);
                }
            }
            FrameType::WindowUpdate => {
                if frame.length > 0 {
                    state.window_size = frame.length;
                }
            }
            FrameType::Headers => {
                if frame.has_flag(FrameFlag::Priority) {
                    state.priority = Some(HeaderPriority {
                        dependency: 0,
                        exclusive: false,
                        weight: SYNTHETIC_PRIORITY_WEIGHT,
                    });
                }
            }
        }
        state.frames.push(frame);
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.state.read().frames.clone()
    }

    pub fn settings(&self) -> Settings {
        self.state.read().settings.clone()
    }

    pub fn window_size(&self) -> u32 {
        self.state.read().window_size
    }

    pub fn priority(&self) -> Option<HeaderPriority> {
        self.state.read().priority
    }

    /// Consistent copy of all aggregate state.
    pub fn snapshot(&self) -> Http2Snapshot {
        let state = self.state.read();
        Http2Snapshot {
            settings: state.settings.clone(),
            window_size: state.window_size,
            priority: state.priority,
            frames: state.frames.clone(),
        }
    }
}

/// Heuristic HEADERS payload size.
///
/// Sums the method, path and `HTTP/1.1` literal lengths plus each header's
/// name and value length and a fixed per-line overhead. This is not the
/// HPACK-encoded size.
pub fn estimate_headers_size(method: &str, path: &str, headers: &[(String, String)]) -> u32 {
    let request_line = method.len() + path.len() + "HTTP/1.1".len();
    let lines: usize = headers
        .iter()
        .map(|(name, value)| name.len() + value.len() + HEADER_LINE_OVERHEAD)
        .sum();
    u32::try_from(request_line + lines).unwrap_or(u32::MAX)
}

/// Flattened header list: pseudo-headers first, then `name: value` with
/// lower-cased names.
pub fn headers_list(
    method: &str,
    path: &str,
    scheme: &str,
    authority: &str,
    headers: &[(String, String)],
) -> Vec<String> {
    let mut lines = vec![
        format!(":method: {}", method),
        format!(":path: {}", path),
        format!(":scheme: {}", scheme),
        format!(":authority: {}", authority),
    ];
    lines.extend(
        headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name.to_ascii_lowercase(), value)),
    );
    lines
}

/// The HEADERS frame recorded for an outbound request on stream 1.
pub fn request_headers_frame(
    method: &str,
    path: &str,
    scheme: &str,
    authority: &str,
    headers: &[(String, String)],
    has_body: bool,
) -> Frame {
    let mut flags = vec![FrameFlag::EndHeaders];
    if !has_body {
        flags.push(FrameFlag::EndStream);
    }
    Frame::headers(
        1,
        estimate_headers_size(method, path, headers),
        flags,
        headers_list(method, path, scheme, authority, headers),
    )
}
