//! # Orbit
//!
//! HTTP client that impersonates browsers at the TLS and HTTP/2 level and
//! reports the fingerprint of every connection it makes: JA3, JA4, JA4_R,
//! PeetPrint and the Akamai HTTP/2 fingerprint.
//!
//! ```rust,ignore
//! let client = orbit::Client::new("Chrome131")?;
//! let response = client.get("https://example.com/").send().await?;
//! println!("{} {}", response.ja3_hash(), response.ja4());
//! ```

pub mod client;
pub mod error;
pub mod fingerprint;
pub mod headers;
pub mod response;
pub mod timeouts;
pub mod tracking;
pub mod transport;
pub mod version;

pub use client::{Client, ClientBuilder, RequestBuilder};
pub use error::{Error, Result};
pub use fingerprint::{assemble, FingerprintData, Profile};
pub use headers::OrderedHeaders;
pub use response::Response;
pub use timeouts::Timeouts;
pub use tracking::{ConnectionDetails, ConnectionRegistry, DialToken, Http2Tracker};
pub use version::HttpVersion;
