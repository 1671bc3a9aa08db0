//! Connection and HTTP/2 activity tracking.

pub mod http2;
pub mod registry;

pub use http2::{Http2Snapshot, Http2Tracker};
pub use registry::{ConnectionDetails, ConnectionRegistry, DialToken};
