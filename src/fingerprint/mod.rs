//! Fingerprint derivation: JA3, JA4, JA4_R, PeetPrint and Akamai HTTP/2
//! strings, the browser profiles they are derived from, and the record
//! assembled for each request.

pub mod assemble;
pub mod data;
pub mod http2;
pub mod ja3;
pub mod ja4;
pub mod names;
pub mod peet;
pub mod profiles;
pub mod tls;

pub use assemble::assemble;
pub use data::{Extension, FingerprintData, Http2Data};
pub use http2::{Frame, FrameFlag, FrameType, HeaderPriority, Http2Settings, SettingId, Settings};
pub use ja3::{Ja3Fields, Ja3Template};
pub use profiles::{BrowserFamily, Profile};
pub use tls::{CertCompression, TlsConfig};
