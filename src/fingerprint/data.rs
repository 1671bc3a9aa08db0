//! The fingerprint record attached to every response.

use serde::Serialize;

use super::http2::{Frame, HeaderPriority, Settings};

/// A TLS extension id with its resolved name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    #[serde(rename = "type")]
    pub id: u16,
    pub name: String,
}

/// HTTP/2 part of a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Http2Data {
    pub settings: Settings,
    pub window_update: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_priority: Option<HeaderPriority>,
    pub sent_frames: Vec<Frame>,
    pub connection_preface: String,
    pub akamai_fingerprint: String,
    pub akamai_fingerprint_hash: String,
}

/// Fingerprint of one completed request.
///
/// Built once by [`assemble`](super::assemble::assemble) and never
/// mutated; the next request produces a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FingerprintData {
    pub tls_version: String,
    pub tls_version_record: String,
    pub tls_version_negotiated: String,
    pub cipher_suites: Vec<String>,
    pub extensions: Vec<Extension>,
    pub supported_groups: Vec<String>,
    pub signature_algorithms: Vec<String>,
    pub ja3: String,
    pub ja3_hash: String,
    pub ja4: String,
    pub ja4_r: String,
    pub peet_print: String,
    pub peet_print_hash: String,
    pub akamai_fingerprint: String,
    pub akamai_fingerprint_hash: String,
    pub client_random: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http2: Option<Http2Data>,
}

impl FingerprintData {
    /// JSON rendering of the record.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
