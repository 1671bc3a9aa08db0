//! Process-wide record of outbound TLS connections.
//!
//! Records are indexed twice: by destination address (last writer wins)
//! and by the [`DialToken`] issued for the dial that produced them. A
//! request reads its own record back through its token, so concurrent
//! requests never see each other's handshakes.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::fingerprint::http2::{Frame, HeaderPriority, Settings};
use crate::tracking::http2::Http2Snapshot;

/// Correlates one dial with the request that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialToken(u64);

impl DialToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// TLS facts captured from one outbound connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDetails {
    pub server_name: String,
    /// Negotiated wire version (`0x0304` for TLS 1.3), `0` if unknown.
    pub tls_version: u16,
    pub cipher_suite: u16,
    pub client_random: Vec<u8>,
    pub session_id: Vec<u8>,
    /// ALPN protocols offered in the ClientHello.
    pub alpn_protocols: Vec<String>,
    pub negotiated_alpn: Option<String>,
    pub supported_groups: Vec<u16>,
    pub signature_algorithms: Vec<u16>,
    /// DER certificates, leaf first.
    pub peer_certificates: Vec<Vec<u8>>,
    pub handshake_complete: bool,
    pub connected_at: DateTime<Utc>,
    pub http2_settings: Settings,
    pub http2_window_update: u32,
    pub http2_priority: Option<HeaderPriority>,
    pub http2_frames: Vec<Frame>,
}

impl Default for ConnectionDetails {
    fn default() -> Self {
        Self::new("")
    }
}

impl ConnectionDetails {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            tls_version: 0,
            cipher_suite: 0,
            client_random: Vec::new(),
            session_id: Vec::new(),
            alpn_protocols: Vec::new(),
            negotiated_alpn: None,
            supported_groups: Vec::new(),
            signature_algorithms: Vec::new(),
            peer_certificates: Vec::new(),
            handshake_complete: false,
            connected_at: Utc::now(),
            http2_settings: Settings::new(),
            http2_window_update: 0,
            http2_priority: None,
            http2_frames: Vec::new(),
        }
    }

    /// Copy of these details with the HTTP/2 aggregate merged in.
    ///
    /// The stored record is left untouched.
    pub fn with_http2(&self, snapshot: Http2Snapshot) -> Self {
        Self {
            http2_settings: snapshot.settings,
            http2_window_update: snapshot.window_size,
            http2_priority: snapshot.priority,
            http2_frames: snapshot.frames,
            ..self.clone()
        }
    }
}

#[derive(Default)]
struct Entries {
    by_address: HashMap<SocketAddr, Arc<ConnectionDetails>>,
    by_token: HashMap<DialToken, Arc<ConnectionDetails>>,
}

/// Thread-safe store of [`ConnectionDetails`].
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: RwLock<Entries>,
    next_token: AtomicU64,
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read();
        f.debug_struct("ConnectionRegistry")
            .field("addresses", &entries.by_address.len())
            .field("pending_tokens", &entries.by_token.len())
            .finish()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by clients that are not given one explicitly.
    pub fn global() -> Arc<ConnectionRegistry> {
        static GLOBAL: OnceLock<Arc<ConnectionRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(ConnectionRegistry::new())).clone()
    }

    /// Issue a fresh token for an upcoming dial.
    ///
    /// The record stored under a token stays until [`take`](Self::take)
    /// or [`clear`](Self::clear) removes it, so every dial that carries a
    /// token should be followed by one of them.
    pub fn issue_token(&self) -> DialToken {
        DialToken(self.next_token.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Store a record, replacing any previous one for `addr`.
    pub fn store(&self, addr: SocketAddr, token: Option<DialToken>, details: ConnectionDetails) {
        tracing::debug!(
            %addr,
            token = token.map(DialToken::get),
            tls_version = details.tls_version,
            cipher = details.cipher_suite,
            "storing connection details"
        );
        let details = Arc::new(details);
        let mut entries = self.entries.write();
        if let Some(token) = token {
            entries.by_token.insert(token, details.clone());
        }
        entries.by_address.insert(addr, details);
    }

    pub fn get(&self, addr: &SocketAddr) -> Option<ConnectionDetails> {
        self.entries.read().by_address.get(addr).map(|d| (**d).clone())
    }

    /// Copy of every per-address record.
    pub fn get_all(&self) -> HashMap<SocketAddr, ConnectionDetails> {
        self.entries
            .read()
            .by_address
            .iter()
            .map(|(addr, d)| (*addr, (**d).clone()))
            .collect()
    }

    /// Record produced by the dial that carried `token`, without consuming it.
    pub fn get_by_token(&self, token: DialToken) -> Option<ConnectionDetails> {
        self.entries.read().by_token.get(&token).map(|d| (**d).clone())
    }

    /// Remove and return the record for `token`.
    ///
    /// The per-address record stays in place.
    pub fn take(&self, token: DialToken) -> Option<ConnectionDetails> {
        self.entries
            .write()
            .by_token
            .remove(&token)
            .map(Arc::unwrap_or_clone)
    }

    /// The most recently connected record across all addresses.
    ///
    /// Under concurrent dials this may belong to another request; use
    /// [`take`](Self::take) with the request's own token instead.
    pub fn most_recent(&self) -> Option<ConnectionDetails> {
        self.entries
            .read()
            .by_address
            .values()
            .max_by_key(|d| d.connected_at)
            .map(|d| (**d).clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record, including token records never taken.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.by_address.clear();
        entries.by_token.clear();
    }
}
