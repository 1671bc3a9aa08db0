//! Tracked TLS dialing and HTTP/1.1 + HTTP/2 exchanges via hyper and
//! tokio-boring.

pub mod connector;
pub mod h1_h2;

pub use connector::{AlpnProtocol, MaybeHttpsStream, TrackedConnector, VerifyHook};
