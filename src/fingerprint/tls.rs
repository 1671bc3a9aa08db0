//! Mapping from a browser profile to BoringSSL handshake parameters.

use boring::ssl::SslVersion;

use super::names::{CIPHER_SUITES, SIGNATURE_ALGORITHMS, SUPPORTED_GROUPS};
use super::profiles::{BrowserFamily, Profile};

/// Certificate compression algorithm advertised in `compress_certificate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertCompression {
    /// Chromium.
    Brotli,
    /// Safari.
    Zlib,
    #[default]
    None,
}

/// TLS handshake parameters derived from a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub min_version: u16,
    pub max_version: u16,
    pub cipher_suites: Vec<u16>,
    pub curves: Vec<u16>,
    pub signature_algorithms: Vec<u16>,
    pub alpn_protocols: Vec<String>,
    pub grease: bool,
    pub cert_compression: CertCompression,
}

impl TlsConfig {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            min_version: profile.tls_version_min,
            max_version: profile.tls_version_max,
            cipher_suites: profile.cipher_suites.to_vec(),
            curves: profile.curves.to_vec(),
            signature_algorithms: profile.signature_algorithms.to_vec(),
            alpn_protocols: profile.alpn_protocols.iter().map(|p| p.to_string()).collect(),
            grease: profile.grease,
            cert_compression: match profile.family {
                BrowserFamily::Chromium => CertCompression::Brotli,
                BrowserFamily::Safari => CertCompression::Zlib,
                BrowserFamily::Firefox => CertCompression::None,
            },
        }
    }

    /// BoringSSL cipher string for the TLS 1.2 suites.
    ///
    /// TLS 1.3 suites are not configurable in BoringSSL and are skipped.
    pub fn cipher_list(&self) -> String {
        self.cipher_suites
            .iter()
            .filter_map(|id| {
                CIPHER_SUITES
                    .iter()
                    .find(|(cid, _, _)| cid == id)
                    .and_then(|(_, _, boring)| *boring)
            })
            .collect::<Vec<_>>()
            .join(":")
    }

    /// BoringSSL curves string. Groups BoringSSL cannot offer are skipped.
    pub fn curves_list(&self) -> String {
        self.curves
            .iter()
            .filter_map(|id| {
                SUPPORTED_GROUPS
                    .iter()
                    .find(|(gid, _, _)| gid == id)
                    .and_then(|(_, _, boring)| *boring)
            })
            .collect::<Vec<_>>()
            .join(":")
    }

    /// BoringSSL signature-algorithm string, using the standard scheme
    /// names. `ed448` is not supported by BoringSSL and is skipped.
    pub fn sigalgs_list(&self) -> String {
        self.signature_algorithms
            .iter()
            .filter_map(|id| SIGNATURE_ALGORITHMS.iter().find(|(sid, _)| sid == id))
            .map(|(_, name)| *name)
            .filter(|name| *name != "ed448")
            .collect::<Vec<_>>()
            .join(":")
    }

    /// ALPN list in wire format (length-prefixed protocol names).
    pub fn alpn_wire(&self) -> Vec<u8> {
        let mut wire = Vec::new();
        for proto in &self.alpn_protocols {
            let Ok(len) = u8::try_from(proto.len()) else {
                continue;
            };
            wire.push(len);
            wire.extend_from_slice(proto.as_bytes());
        }
        wire
    }
}

/// BoringSSL protocol version for a wire version number.
pub fn ssl_version(version: u16) -> Option<SslVersion> {
    match version {
        0x0301 => Some(SslVersion::TLS1),
        0x0302 => Some(SslVersion::TLS1_1),
        0x0303 => Some(SslVersion::TLS1_2),
        0x0304 => Some(SslVersion::TLS1_3),
        _ => None,
    }
}

/// Wire version number for a BoringSSL version string (`"TLSv1.3"`).
pub fn wire_version(version: &str) -> u16 {
    match version {
        "TLSv1" => 0x0301,
        "TLSv1.1" => 0x0302,
        "TLSv1.2" => 0x0303,
        "TLSv1.3" => 0x0304,
        _ => 0,
    }
}
