//! HTTP/2 fingerprint types: SETTINGS, synthesized frames, and the Akamai
//! fingerprint string.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ja3::md5_hex;

/// Client connection preface (RFC 9113 Section 3.4).
pub const CONNECTION_PREFACE: &str = "PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

/// Pseudo-header send order reported in the Akamai fingerprint
/// (`:method`, `:authority`, `:path`, `:scheme`).
pub const PSEUDO_HEADER_ORDER: &str = "m,a,p,s";

/// The six well-known SETTINGS identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingId {
    HeaderTableSize = 1,
    EnablePush = 2,
    MaxConcurrentStreams = 3,
    InitialWindowSize = 4,
    MaxFrameSize = 5,
    MaxHeaderListSize = 6,
}

impl SettingId {
    /// All identifiers, in wire-id order.
    pub const ALL: [SettingId; 6] = [
        SettingId::HeaderTableSize,
        SettingId::EnablePush,
        SettingId::MaxConcurrentStreams,
        SettingId::InitialWindowSize,
        SettingId::MaxFrameSize,
        SettingId::MaxHeaderListSize,
    ];

    /// Numeric SETTINGS identifier.
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Look up an identifier by its numeric value.
    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// RFC name without the `SETTINGS_` prefix.
    pub fn name(self) -> &'static str {
        match self {
            Self::HeaderTableSize => "HEADER_TABLE_SIZE",
            Self::EnablePush => "ENABLE_PUSH",
            Self::MaxConcurrentStreams => "MAX_CONCURRENT_STREAMS",
            Self::InitialWindowSize => "INITIAL_WINDOW_SIZE",
            Self::MaxFrameSize => "MAX_FRAME_SIZE",
            Self::MaxHeaderListSize => "MAX_HEADER_LIST_SIZE",
        }
    }

    /// Look up an identifier by its RFC name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// SETTINGS key → value, iterated in wire-id order.
pub type Settings = BTreeMap<SettingId, u32>;

/// Synthesized frame kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameType {
    Settings,
    WindowUpdate,
    Headers,
}

/// Frame flags as reported in the sent-frame list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameFlag {
    Ack,
    EndStream,
    EndHeaders,
    Padded,
    Priority,
}

/// One synthesized HTTP/2 protocol event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub frame_type: FrameType,
    pub stream_id: u32,
    /// Byte-length estimate; for WINDOW_UPDATE this is the increment.
    pub length: u32,
    pub flags: Vec<FrameFlag>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: Settings,
}

impl Frame {
    /// A SETTINGS frame on stream 0.
    pub fn settings(length: u32, settings: Settings) -> Self {
        Self {
            frame_type: FrameType::Settings,
            stream_id: 0,
            length,
            flags: Vec::new(),
            headers: Vec::new(),
            settings,
        }
    }

    /// A connection-level WINDOW_UPDATE carrying `increment`.
    pub fn window_update(increment: u32) -> Self {
        Self {
            frame_type: FrameType::WindowUpdate,
            stream_id: 0,
            length: increment,
            flags: Vec::new(),
            headers: Vec::new(),
            settings: Settings::new(),
        }
    }

    /// A HEADERS frame with a flattened `name: value` header list.
    pub fn headers(stream_id: u32, length: u32, flags: Vec<FrameFlag>, headers: Vec<String>) -> Self {
        Self {
            frame_type: FrameType::Headers,
            stream_id,
            length,
            flags,
            headers,
            settings: Settings::new(),
        }
    }

    pub fn has_flag(&self, flag: FrameFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Stream priority attached to a HEADERS frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderPriority {
    pub dependency: u32,
    pub exclusive: bool,
    pub weight: u8,
}

/// Per-browser HTTP/2 connection parameters sent at connection start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Http2Settings {
    pub header_table_size: u32,
    pub enable_push: bool,
    pub max_concurrent_streams: u32,
    pub initial_window_size: u32,
    pub max_frame_size: u32,
    pub max_header_list_size: u32,
    /// Connection-level WINDOW_UPDATE increment sent after SETTINGS.
    pub window_update: u32,
    /// Reported length of the initial SETTINGS frame.
    pub settings_frame_length: u32,
}

impl Default for Http2Settings {
    fn default() -> Self {
        Self::chromium()
    }
}

impl Http2Settings {
    /// Chrome, Edge, Opera, Brave.
    pub fn chromium() -> Self {
        Self {
            header_table_size: 65536,
            enable_push: false,
            max_concurrent_streams: 1000,
            initial_window_size: 6291456,
            max_frame_size: 16384,
            max_header_list_size: 262144,
            window_update: 1073741824,
            settings_frame_length: 24,
        }
    }

    /// Firefox and derivatives.
    pub fn firefox() -> Self {
        Self {
            header_table_size: 65536,
            enable_push: true,
            max_concurrent_streams: 1000,
            initial_window_size: 131072,
            max_frame_size: 16384,
            max_header_list_size: 262144,
            window_update: 12517376,
            settings_frame_length: 24,
        }
    }

    /// Safari (macOS and iOS).
    pub fn safari() -> Self {
        Self {
            header_table_size: 4096,
            enable_push: true,
            max_concurrent_streams: 100,
            initial_window_size: 2097152,
            max_frame_size: 16384,
            max_header_list_size: 8192,
            window_update: 2013265920,
            settings_frame_length: 20,
        }
    }

    /// The SETTINGS map this preset advertises.
    pub fn settings(&self) -> Settings {
        Settings::from([
            (SettingId::HeaderTableSize, self.header_table_size),
            (SettingId::EnablePush, u32::from(self.enable_push)),
            (SettingId::MaxConcurrentStreams, self.max_concurrent_streams),
            (SettingId::InitialWindowSize, self.initial_window_size),
            (SettingId::MaxFrameSize, self.max_frame_size),
            (SettingId::MaxHeaderListSize, self.max_header_list_size),
        ])
    }

    /// The SETTINGS and WINDOW_UPDATE frames that open a connection.
    pub fn initial_frames(&self) -> [Frame; 2] {
        [
            Frame::settings(self.settings_frame_length, self.settings()),
            Frame::window_update(self.window_update),
        ]
    }
}

fn settings_segment(settings: &Settings) -> String {
    SettingId::ALL
        .into_iter()
        .filter_map(|id| settings.get(&id).map(|v| format!("{}:{}", id.id(), v)))
        .collect::<Vec<_>>()
        .join(";")
}

/// Akamai HTTP/2 fingerprint: `<settings>|<window>|0|m,a,p,s`.
///
/// The priority segment is always `0`; see
/// [`akamai_fingerprint_with_priority`] for the variant that reflects an
/// exclusive stream dependency.
pub fn akamai_fingerprint(settings: &Settings, window_update: u32) -> String {
    format!(
        "{}|{}|0|{}",
        settings_segment(settings),
        window_update,
        PSEUDO_HEADER_ORDER
    )
}

/// Akamai fingerprint whose priority segment is `1` for an exclusive
/// dependency and `0` otherwise.
pub fn akamai_fingerprint_with_priority(
    settings: &Settings,
    window_update: u32,
    priority: Option<&HeaderPriority>,
) -> String {
    let priority = match priority {
        Some(p) if p.exclusive => "1",
        _ => "0",
    };
    format!(
        "{}|{}|{}|{}",
        settings_segment(settings),
        window_update,
        priority,
        PSEUDO_HEADER_ORDER
    )
}

/// MD5 hex of an Akamai fingerprint string.
pub fn akamai_hash(fingerprint: &str) -> String {
    md5_hex(fingerprint)
}
