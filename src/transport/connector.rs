//! BoringSSL dialer that records every handshake in a
//! [`ConnectionRegistry`].

use std::fmt;
use std::io;
use std::io::Read;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use boring::ssl::{SslConnector, SslMethod, SslRef, SslSessionCacheMode, SslVerifyMode};
use boring::x509::{X509StoreContext, X509StoreContextRef, X509};
use chrono::Utc;
use http::Uri;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

use crate::error::{Error, Result};
use crate::fingerprint::names::cipher_suite_id;
use crate::fingerprint::tls::{ssl_version, wire_version, CertCompression, TlsConfig};
use crate::timeouts::with_deadline;
use crate::tracking::registry::{ConnectionDetails, ConnectionRegistry, DialToken};

// FFI bindings for BoringSSL extension control
use boring_sys::{CRYPTO_BUFFER, SSL, SSL_CTX};
use std::os::raw::c_int;

extern "C" {
    /// Enable GREASE values in the ClientHello.
    pub fn SSL_CTX_set_grease_enabled(ctx: *mut SSL_CTX, enabled: c_int) -> c_int;
    /// Randomize extension order per connection.
    pub fn SSL_CTX_set_permute_extensions(ctx: *mut SSL_CTX, enabled: c_int) -> c_int;
}

/// Caller verification hook. Receives BoringSSL's verdict for the
/// certificate under inspection; its return value decides the handshake.
pub type VerifyHook = Arc<dyn Fn(bool, &mut X509StoreContextRef) -> bool + Send + Sync>;

fn crypto_buffer_from(data: &[u8], out: *mut *mut CRYPTO_BUFFER) -> c_int {
    // CRYPTO_BUFFER_new copies `data`.
    let buffer = unsafe { boring_sys::CRYPTO_BUFFER_new(data.as_ptr(), data.len(), std::ptr::null_mut()) };
    if buffer.is_null() {
        return 0;
    }
    unsafe { *out = buffer };
    1
}

/// Brotli certificate decompression (RFC 8879), as Chromium offers.
unsafe extern "C" fn decompress_brotli_cert(
    _ssl: *mut SSL,
    out: *mut *mut CRYPTO_BUFFER,
    uncompressed_len: usize,
    in_: *const u8,
    in_len: usize,
) -> c_int {
    let compressed = std::slice::from_raw_parts(in_, in_len);
    let mut decompressed = Vec::with_capacity(uncompressed_len);
    match brotli::Decompressor::new(compressed, 4096).read_to_end(&mut decompressed) {
        Ok(_) if decompressed.len() == uncompressed_len => crypto_buffer_from(&decompressed, out),
        _ => 0,
    }
}

/// Zlib certificate decompression, as Safari offers.
unsafe extern "C" fn decompress_zlib_cert(
    _ssl: *mut SSL,
    out: *mut *mut CRYPTO_BUFFER,
    uncompressed_len: usize,
    in_: *const u8,
    in_len: usize,
) -> c_int {
    let compressed = std::slice::from_raw_parts(in_, in_len);
    let mut decompressed = Vec::with_capacity(uncompressed_len);
    match flate2::read::ZlibDecoder::new(compressed).read_to_end(&mut decompressed) {
        Ok(_) if decompressed.len() == uncompressed_len => crypto_buffer_from(&decompressed, out),
        _ => 0,
    }
}

/// TLS dialer configured from a browser profile.
#[derive(Clone)]
pub struct TrackedConnector {
    tls: TlsConfig,
    registry: Arc<ConnectionRegistry>,
    root_certs: Vec<Vec<u8>>,
    verify_hook: Option<VerifyHook>,
    connect_timeout: Option<Duration>,
}

impl fmt::Debug for TrackedConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedConnector")
            .field("tls", &self.tls)
            .field("root_certs", &self.root_certs.len())
            .field("verify_hook", &self.verify_hook.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl TrackedConnector {
    pub fn new(tls: TlsConfig, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            tls,
            registry,
            root_certs: Vec::new(),
            verify_hook: None,
            connect_timeout: None,
        }
    }

    /// Add trusted root certificates (DER or PEM).
    pub fn with_root_certificates(mut self, certs: Vec<Vec<u8>>) -> Self {
        self.root_certs = certs;
        self
    }

    pub fn with_verify_hook(mut self, hook: Option<VerifyHook>) -> Self {
        self.verify_hook = hook;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn tls_config(&self) -> &TlsConfig {
        &self.tls
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    fn configure_ssl(&self) -> Result<SslConnector> {
        let tls = &self.tls;
        let mut builder = SslConnector::builder(SslMethod::tls_client())
            .map_err(|e| Error::tls(format!("Failed to create SSL connector: {}", e)))?;

        for cert_bytes in &self.root_certs {
            let cert = X509::from_der(cert_bytes)
                .or_else(|_| X509::from_pem(cert_bytes))
                .map_err(|e| Error::tls(format!("Invalid root certificate: {}", e)))?;
            builder
                .cert_store_mut()
                .add_cert(cert)
                .map_err(|e| Error::tls(format!("Failed to add root certificate: {}", e)))?;
        }

        let ciphers = tls.cipher_list();
        if !ciphers.is_empty() {
            builder
                .set_cipher_list(&ciphers)
                .map_err(|e| Error::tls(format!("Failed to set cipher list: {}", e)))?;
        }

        let curves = tls.curves_list();
        if !curves.is_empty() {
            builder
                .set_curves_list(&curves)
                .map_err(|e| Error::tls(format!("Failed to set curves: {}", e)))?;
        }

        let sigalgs = tls.sigalgs_list();
        if !sigalgs.is_empty() {
            builder
                .set_sigalgs_list(&sigalgs)
                .map_err(|e| Error::tls(format!("Failed to set signature algorithms: {}", e)))?;
        }

        unsafe {
            let ctx = builder.as_ptr() as *mut SSL_CTX;
            SSL_CTX_set_grease_enabled(ctx, c_int::from(tls.grease));
            SSL_CTX_set_permute_extensions(ctx, 1);

            // Decompression only; the client never compresses certificates.
            match tls.cert_compression {
                CertCompression::Brotli => {
                    boring_sys::SSL_CTX_add_cert_compression_alg(
                        ctx,
                        boring_sys::TLSEXT_cert_compression_brotli as u16,
                        None,
                        Some(decompress_brotli_cert),
                    );
                }
                CertCompression::Zlib => {
                    boring_sys::SSL_CTX_add_cert_compression_alg(
                        ctx,
                        boring_sys::TLSEXT_cert_compression_zlib as u16,
                        None,
                        Some(decompress_zlib_cert),
                    );
                }
                CertCompression::None => {}
            }
        }

        builder
            .set_min_proto_version(ssl_version(tls.min_version))
            .map_err(|e| Error::tls(format!("Failed to set min TLS version: {}", e)))?;
        builder
            .set_max_proto_version(ssl_version(tls.max_version))
            .map_err(|e| Error::tls(format!("Failed to set max TLS version: {}", e)))?;

        builder.set_session_cache_mode(SslSessionCacheMode::CLIENT);

        let alpn = tls.alpn_wire();
        if !alpn.is_empty() {
            builder
                .set_alpn_protos(&alpn)
                .map_err(|e| Error::tls(format!("Failed to set ALPN: {}", e)))?;
        }

        Ok(builder.build())
    }

    fn new_details(&self, server_name: &str) -> ConnectionDetails {
        ConnectionDetails {
            alpn_protocols: self.tls.alpn_protocols.clone(),
            supported_groups: self.tls.curves.clone(),
            signature_algorithms: self.tls.signature_algorithms.clone(),
            ..ConnectionDetails::new(server_name)
        }
    }

    /// TCP connect and TLS handshake to `host:port`.
    ///
    /// Version, cipher and certificate chain are captured while the peer
    /// certificate is verified and captured again from the finished
    /// session. On success the record is stored under the peer address
    /// (and under `token`, if given). On failure nothing is stored.
    ///
    /// A token record is held until the caller takes it with
    /// [`ConnectionRegistry::take`] or clears the registry.
    pub async fn dial(
        &self,
        host: &str,
        port: u16,
        token: Option<DialToken>,
    ) -> Result<(SslStream<TcpStream>, SocketAddr)> {
        tracing::debug!(host, port, token = token.map(DialToken::get), "dialing");
        let started = Utc::now();

        let dial = async {
            let tcp = TcpStream::connect((host, port))
                .await
                .map_err(|e| Error::connection(format!("Failed to connect to {}:{}: {}", host, port, e)))?;
            let peer = tcp.peer_addr()?;

            let connector = self.configure_ssl()?;
            let mut config = connector
                .configure()
                .map_err(|e| Error::tls(format!("Failed to configure SSL: {}", e)))?;

            let captured = Arc::new(Mutex::new(self.new_details(host)));
            let in_verify = captured.clone();
            let hook = self.verify_hook.clone();
            config.set_verify_callback(SslVerifyMode::PEER, move |preverify_ok, ctx| {
                record_verification(&mut in_verify.lock(), ctx);
                match &hook {
                    Some(hook) => hook(preverify_ok, ctx),
                    None => preverify_ok,
                }
            });

            let stream = tokio_boring::connect(config, host, tcp)
                .await
                .map_err(|e| Error::tls(format!("TLS handshake failed: {}", e)))?;

            let mut details = captured.lock().clone();
            record_session(&mut details, stream.ssl());
            details.connected_at = started;
            Ok::<_, Error>((stream, peer, details))
        };

        let (stream, peer, details) = with_deadline(self.connect_timeout, Error::ConnectTimeout, dial)
            .await
            .inspect_err(|e| tracing::debug!(host, port, error = %e, "dial failed"))?;

        self.registry.store(peer, token, details);
        Ok((stream, peer))
    }

    /// Dial the host in `uri`; plain TCP for `http`, tracked TLS for `https`.
    pub async fn connect(&self, uri: &Uri, token: Option<DialToken>) -> Result<MaybeHttpsStream> {
        let host = uri
            .host()
            .ok_or_else(|| Error::connection("Missing host"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let https = uri.scheme_str() == Some("https");
        let port = uri.port_u16().unwrap_or(if https { 443 } else { 80 });

        if https {
            let (stream, _) = self.dial(host, port, token).await?;
            Ok(MaybeHttpsStream::Https(stream))
        } else {
            let tcp = with_deadline(self.connect_timeout, Error::ConnectTimeout, async {
                TcpStream::connect((host, port)).await.map_err(|e| {
                    Error::connection(format!("Failed to connect to {}:{}: {}", host, port, e))
                })
            })
            .await?;
            Ok(MaybeHttpsStream::Http(tcp))
        }
    }
}

/// Capture what is known while the peer certificate is being verified.
fn record_verification(details: &mut ConnectionDetails, ctx: &X509StoreContextRef) {
    if let Some(chain) = ctx.chain() {
        let chain: Vec<Vec<u8>> = chain.iter().filter_map(|cert| cert.to_der().ok()).collect();
        if !chain.is_empty() {
            details.peer_certificates = chain;
        }
    }
    let ssl = X509StoreContext::ssl_idx()
        .ok()
        .and_then(|idx| ctx.ex_data(idx));
    if let Some(ssl) = ssl {
        record_negotiated(details, ssl);
    }
}

fn record_negotiated(details: &mut ConnectionDetails, ssl: &SslRef) {
    let version = wire_version(ssl.version_str());
    if version != 0 {
        details.tls_version = version;
    }
    if let Some(cipher) = ssl.current_cipher() {
        if let Some(id) = cipher_suite_id(cipher.name()) {
            details.cipher_suite = id;
        }
    }
}

/// Capture the finished session's state.
fn record_session(details: &mut ConnectionDetails, ssl: &SslRef) {
    record_negotiated(details, ssl);

    let mut random = [0u8; 32];
    let len = ssl.client_random(&mut random);
    details.client_random = random[..len].to_vec();

    if let Some(session) = ssl.session() {
        details.session_id = session.id().to_vec();
    }
    details.negotiated_alpn = ssl
        .selected_alpn_protocol()
        .map(|p| String::from_utf8_lossy(p).into_owned());

    if let Some(chain) = ssl.peer_cert_chain() {
        let chain: Vec<Vec<u8>> = chain.iter().filter_map(|cert| cert.to_der().ok()).collect();
        if !chain.is_empty() {
            details.peer_certificates = chain;
        }
    }
    details.handshake_complete = true;
}

/// Negotiated ALPN protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlpnProtocol {
    H2,
    Http1,
    /// No ALPN negotiated or an unknown protocol.
    Unknown,
}

impl AlpnProtocol {
    pub fn is_h2(&self) -> bool {
        matches!(self, Self::H2)
    }
}

/// Either a plain TCP stream or a TLS stream.
#[derive(Debug)]
pub enum MaybeHttpsStream {
    Http(TcpStream),
    Https(SslStream<TcpStream>),
}

impl MaybeHttpsStream {
    /// Protocol selected by ALPN; plain TCP never negotiates one.
    pub fn alpn_protocol(&self) -> AlpnProtocol {
        match self {
            MaybeHttpsStream::Http(_) => AlpnProtocol::Unknown,
            MaybeHttpsStream::Https(stream) => match stream.ssl().selected_alpn_protocol() {
                Some(b"h2") => AlpnProtocol::H2,
                Some(b"http/1.1") => AlpnProtocol::Http1,
                _ => AlpnProtocol::Unknown,
            },
        }
    }
}

impl AsyncRead for MaybeHttpsStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            MaybeHttpsStream::Http(stream) => Pin::new(stream).poll_read(cx, buf),
            MaybeHttpsStream::Https(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeHttpsStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            MaybeHttpsStream::Http(stream) => Pin::new(stream).poll_write(cx, buf),
            MaybeHttpsStream::Https(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            MaybeHttpsStream::Http(stream) => Pin::new(stream).poll_flush(cx),
            MaybeHttpsStream::Https(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            MaybeHttpsStream::Http(stream) => Pin::new(stream).poll_shutdown(cx),
            MaybeHttpsStream::Https(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
