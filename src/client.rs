//! Browser-impersonating client session.
//!
//! A session owns one [`Profile`], an ordered set of custom headers, a
//! tracked TLS connector and an [`Http2Tracker`]. After each request the
//! session assembles a [`FingerprintData`] from the request's own
//! connection record and attaches it to the response.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method};
use http_body_util::{BodyExt, Full};
use parking_lot::RwLock;
use url::{Position, Url};

use crate::error::{Error, Result};
use crate::fingerprint::assemble::assemble;
use crate::fingerprint::http2::Http2Settings;
use crate::fingerprint::ja3::{ja3_hash, parse_ja3};
use crate::fingerprint::ja4::{ja4, ja4r};
use crate::fingerprint::profiles::{self, Profile, DEFAULT_PROFILE};
use crate::fingerprint::tls::TlsConfig;
use crate::fingerprint::FingerprintData;
use crate::headers::{request_headers, OrderedHeaders};
use crate::response::Response;
use crate::timeouts::{with_deadline, Timeouts};
use crate::tracking::http2::{request_headers_frame, Http2Tracker};
use crate::tracking::registry::ConnectionRegistry;
use crate::transport::connector::{TrackedConnector, VerifyHook};
use crate::transport::h1_h2::{send_http1, send_http2};
use crate::version::HttpVersion;

struct ClientInner {
    profile: Arc<Profile>,
    headers: RwLock<OrderedHeaders>,
    connector: TrackedConnector,
    registry: Arc<ConnectionRegistry>,
    tracker: Http2Tracker,
    http2_settings: Http2Settings,
    last_fingerprint: RwLock<Arc<FingerprintData>>,
    timeouts: Timeouts,
    version: HttpVersion,
}

/// A client session impersonating one browser profile.
///
/// Cloning is cheap and clones share headers, tracker and the last
/// fingerprint.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("profile", &self.inner.profile.name)
            .field("version", &self.inner.version)
            .finish()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    profile: Option<Profile>,
    profile_name: String,
    timeouts: Timeouts,
    root_certs: Vec<Vec<u8>>,
    registry: Option<Arc<ConnectionRegistry>>,
    verify_hook: Option<VerifyHook>,
    version: HttpVersion,
    headers: OrderedHeaders,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            profile: None,
            profile_name: DEFAULT_PROFILE.to_string(),
            timeouts: Timeouts::api_defaults(),
            root_certs: Vec::new(),
            registry: None,
            verify_hook: None,
            version: HttpVersion::Auto,
            headers: OrderedHeaders::new(),
        }
    }

    /// Use a built-in profile by name.
    pub fn profile_name(mut self, name: impl Into<String>) -> Self {
        self.profile_name = name.into();
        self.profile = None;
        self
    }

    /// Use an explicit profile value.
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connect = Some(timeout);
        self
    }

    pub fn ttfb_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.ttfb = Some(timeout);
        self
    }

    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.total = Some(timeout);
        self
    }

    /// Trust additional root certificates (DER or PEM).
    pub fn root_certificates(mut self, certs: Vec<Vec<u8>>) -> Self {
        self.root_certs = certs;
        self
    }

    pub fn add_root_certificate(mut self, cert: impl Into<Vec<u8>>) -> Self {
        self.root_certs.push(cert.into());
        self
    }

    /// Record connections in `registry` instead of the process-wide one.
    pub fn registry(mut self, registry: Arc<ConnectionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Certificate verification hook; its verdict decides the handshake.
    pub fn verify_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(bool, &mut boring::x509::X509StoreContextRef) -> bool + Send + Sync + 'static,
    {
        self.verify_hook = Some(Arc::new(hook));
        self
    }

    pub fn http_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    /// Session-wide custom header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn build(self) -> Result<Client> {
        let profile = match self.profile {
            Some(profile) => profile,
            None => profiles::get(&self.profile_name)
                .cloned()
                .ok_or_else(|| Error::UnknownProfile(self.profile_name.clone()))?,
        };

        let registry = self.registry.unwrap_or_else(ConnectionRegistry::global);
        let mut tls = TlsConfig::from_profile(&profile);
        tls.alpn_protocols = self.version.alpn_protocols(&tls.alpn_protocols);

        let connector = TrackedConnector::new(tls, registry.clone())
            .with_root_certificates(self.root_certs)
            .with_verify_hook(self.verify_hook)
            .with_connect_timeout(self.timeouts.connect);

        let http2_settings = profile.family.http2_settings();
        let tracker = Http2Tracker::with_preset(&http2_settings);
        let initial = Arc::new(assemble(&profile, None));

        tracing::debug!(profile = profile.name, version = self.version.as_str(), "client built");

        Ok(Client {
            inner: Arc::new(ClientInner {
                profile: Arc::new(profile),
                headers: RwLock::new(self.headers),
                connector,
                registry,
                tracker,
                http2_settings,
                last_fingerprint: RwLock::new(initial),
                timeouts: self.timeouts,
                version: self.version,
            }),
        })
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client for a built-in profile with default settings.
    pub fn new(profile_name: &str) -> Result<Self> {
        Self::builder().profile_name(profile_name).build()
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::PUT, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::DELETE, url)
    }

    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::PATCH, url)
    }

    pub fn head(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::HEAD, url)
    }

    pub fn options(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::OPTIONS, url)
    }

    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder {
            client: self,
            method,
            url: url.into(),
            headers: OrderedHeaders::new(),
            params: Vec::new(),
            body: None,
            timeout: None,
            error: None,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.inner.profile
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.inner.registry
    }

    pub fn http2_tracker(&self) -> &Http2Tracker {
        &self.inner.tracker
    }

    /// Fingerprint of the most recent completed request.
    ///
    /// Until a request completes this is the template-only record with
    /// zero client-random and session-id.
    pub fn fingerprint(&self) -> Arc<FingerprintData> {
        self.inner.last_fingerprint.read().clone()
    }

    pub fn ja3(&self) -> String {
        self.inner.profile.ja3.to_string()
    }

    pub fn ja3_hash(&self) -> String {
        ja3_hash(self.inner.profile.ja3)
    }

    /// JA4 of the last request, or computed from the profile template
    /// while the record carries none.
    pub fn ja4(&self) -> String {
        self.last_or_template(|fp| fp.ja4.clone(), |f, alpn| {
            ja4(f.tls_version, &f.cipher_suites, &f.extensions, &f.supported_groups, alpn)
        })
    }

    pub fn ja4_r(&self) -> String {
        self.last_or_template(|fp| fp.ja4_r.clone(), |f, alpn| {
            ja4r(f.tls_version, &f.cipher_suites, &f.extensions, &f.supported_groups, alpn)
        })
    }

    fn last_or_template(
        &self,
        last: impl Fn(&FingerprintData) -> String,
        from_template: impl Fn(&crate::fingerprint::Ja3Fields, &[&str]) -> String,
    ) -> String {
        let value = last(&self.fingerprint());
        if !value.is_empty() {
            return value;
        }
        let profile = &self.inner.profile;
        parse_ja3(profile.ja3)
            .map(|fields| from_template(&fields, profile.alpn_protocols))
            .unwrap_or_default()
    }

    fn last_field(&self, field: impl Fn(&FingerprintData) -> &str) -> String {
        field(&self.fingerprint()).to_string()
    }

    pub fn peet_print(&self) -> String {
        self.last_field(|fp| fp.peet_print.as_str())
    }

    pub fn akamai_fingerprint(&self) -> String {
        self.last_field(|fp| fp.akamai_fingerprint.as_str())
    }

    pub fn client_random(&self) -> String {
        self.last_field(|fp| fp.client_random.as_str())
    }

    pub fn session_id(&self) -> String {
        self.last_field(|fp| fp.session_id.as_str())
    }

    pub fn set_header(&self, name: &str, value: impl Into<String>) {
        self.inner.headers.write().set(name, value);
    }

    pub fn set_headers<I, K, V>(&self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.inner.headers.write().set_many(headers);
    }

    pub fn set_headers_from_pairs<S: AsRef<str>>(&self, pairs: &[Vec<S>]) -> Result<()> {
        self.inner.headers.write().set_from_pairs(pairs)
    }

    pub fn set_headers_from_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<()> {
        self.inner.headers.write().set_from_lines(lines)
    }

    pub fn set_headers_from_json(&self, json: &str) -> Result<()> {
        self.inner.headers.write().set_from_json(json)
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.inner.headers.read().get(name).map(str::to_string)
    }

    pub fn headers(&self) -> HashMap<String, String> {
        self.inner.headers.read().to_vec().into_iter().collect()
    }

    pub fn headers_ordered(&self) -> Vec<(String, String)> {
        self.inner.headers.read().to_vec()
    }

    pub fn remove_header(&self, name: &str) {
        self.inner.headers.write().remove(name);
    }

    pub fn clear_headers(&self) {
        self.inner.headers.write().clear();
    }
}

/// One pending request.
pub struct RequestBuilder<'a> {
    client: &'a Client,
    method: Method,
    url: String,
    headers: OrderedHeaders,
    params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
    error: Option<Error>,
}

impl<'a> RequestBuilder<'a> {
    /// Per-request header. Any per-request header switches the request
    /// from the profile's full default set to custom-first ordering.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.headers.set_many(headers);
        self
    }

    /// Append a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Total deadline for this request, replacing the client's.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// JSON body with `Content-Type: application/json`.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.body = Some(body);
                self.headers.set("Content-Type", "application/json");
            }
            Err(e) => self.error = Some(e.into()),
        }
        self
    }

    pub async fn send(self) -> Result<Response> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let inner = &self.client.inner;

        let mut url = Url::parse(&self.url)?;
        if !self.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        let uri: http::Uri = url
            .as_str()
            .parse()
            .map_err(|e| Error::http_protocol(format!("Invalid URI: {}", e)))?;
        let path = &url[Position::BeforePath..];
        let authority = &url[Position::BeforeHost..Position::AfterPort];

        let headers = {
            let custom = inner.headers.read();
            request_headers(&inner.profile, &custom, &self.headers, self.method.as_str())
        }
        .to_vec();

        inner.tracker.track_frame(request_headers_frame(
            self.method.as_str(),
            path,
            url.scheme(),
            authority,
            &headers,
            self.body.is_some(),
        ));

        let token = inner.registry.issue_token();
        let deadline = self.timeout.or(inner.timeouts.total);
        let exchange = async {
            let stream = inner.connector.connect(&uri, Some(token)).await?;
            let use_h2 = match inner.version {
                HttpVersion::Http1_1 => false,
                HttpVersion::Http2 => {
                    if !stream.alpn_protocol().is_h2() {
                        return Err(Error::http_protocol("server did not negotiate h2"));
                    }
                    true
                }
                HttpVersion::Auto => stream.alpn_protocol().is_h2(),
            };

            let mut builder = hyper::Request::builder().method(self.method.clone());
            builder = if use_h2 {
                builder.uri(uri.clone())
            } else {
                builder.uri(path).header(http::header::HOST, authority)
            };
            for (name, value) in &headers {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::invalid_header(format!("{}: {}", name, e)))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| Error::invalid_header(format!("{}: {}", name, e)))?;
                builder = builder.header(name, value);
            }
            let body = Full::new(Bytes::from(self.body.clone().unwrap_or_default()));
            let request = builder
                .body(body)
                .map_err(|e| Error::http_protocol(format!("Failed to build request: {}", e)))?;

            let response = with_deadline(inner.timeouts.ttfb, Error::TtfbTimeout, async {
                if use_h2 {
                    send_http2(stream, request, &inner.http2_settings).await
                } else {
                    send_http1(stream, request).await
                }
            })
            .await?;

            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| Error::http_protocol(format!("Failed to read body: {}", e)))?
                .to_bytes();
            let header_lines: Vec<String> = parts
                .headers
                .iter()
                .map(|(name, value)| format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes())))
                .collect();
            let http_version = if use_h2 { "HTTP/2" } else { "HTTP/1.1" };
            Ok::<_, Error>((parts.status.as_u16(), header_lines, body, http_version))
        };

        let result = with_deadline(deadline, Error::TotalTimeout, exchange).await;
        let details = inner.registry.take(token);
        let (status, header_lines, body, http_version) = result?;

        let merged = details.map(|d| d.with_http2(inner.tracker.snapshot()));
        let fingerprint = Arc::new(assemble(inner.profile.as_ref(), merged.as_ref()));
        *inner.last_fingerprint.write() = fingerprint.clone();

        tracing::debug!(
            method = %self.method,
            url = %url,
            status,
            http_version,
            "request complete"
        );
        Ok(Response::new(status, header_lines, body, http_version, fingerprint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_profile() {
        assert!(matches!(Client::new("Netscape4"), Err(Error::UnknownProfile(name)) if name == "Netscape4"));
    }

    #[test]
    fn test_accessors_before_any_request() {
        let client = Client::builder()
            .profile_name("Chrome131")
            .registry(Arc::new(ConnectionRegistry::new()))
            .build()
            .unwrap();

        assert_eq!(client.ja3(), client.profile().ja3);
        assert_eq!(client.ja3_hash(), ja3_hash(client.profile().ja3));
        assert!(client.ja4().starts_with("t12h21516_"));
        assert!(client.ja4_r().starts_with("t12h2_1301,1302,1303,c02b"));
        assert!(client.peet_print().is_empty());
        assert_eq!(client.client_random(), "0".repeat(64));
        assert_eq!(client.session_id(), "0".repeat(64));
        assert_eq!(client.fingerprint().ja3, client.profile().ja3);
        assert_eq!(client.http2_tracker().frames().len(), 2);
    }

    #[test]
    fn test_new_session_carries_template_fingerprint() {
        let base = profiles::get("Chrome131").cloned().unwrap();
        let client = Client::builder()
            .profile(Profile {
                ja3: "771,4865-4866,0-23,29-23,0",
                ..base
            })
            .registry(Arc::new(ConnectionRegistry::new()))
            .build()
            .unwrap();

        let fp = client.fingerprint();
        assert_eq!(fp.ja3, "771,4865-4866,0-23,29-23,0");
        assert_eq!(fp.ja3_hash, "40a8d16d28297af652a24c22c97c89a8");
        assert_eq!(fp.client_random, "0".repeat(64));
        assert_eq!(fp.session_id, "0".repeat(64));
        assert!(fp.http2.is_none());
        assert_eq!(client.ja3_hash(), fp.ja3_hash);
        assert_eq!(client.ja4(), "t12h21516_1301,1302_0000,0017");
    }

    #[test]
    fn test_session_headers() {
        let client = Client::builder()
            .profile_name("Firefox121")
            .header("X-Build", "1")
            .registry(Arc::new(ConnectionRegistry::new()))
            .build()
            .unwrap();

        client.set_header("Authorization", "Bearer t");
        client.set_headers_from_lines(&["X-Line: a"]).unwrap();
        assert_eq!(client.header("authorization").as_deref(), Some("Bearer t"));
        assert_eq!(
            client.headers_ordered().iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            vec!["x-build", "authorization", "x-line"]
        );

        client.remove_header("X-Build");
        assert_eq!(client.headers().len(), 2);
        client.clear_headers();
        assert!(client.headers().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let client = Client::builder()
            .registry(Arc::new(ConnectionRegistry::new()))
            .build()
            .unwrap();
        let err = client.get("not a url").send().await.unwrap_err();
        assert!(matches!(err, Error::UrlParse(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let registry = Arc::new(ConnectionRegistry::new());
        let client = Client::builder().registry(registry.clone()).build().unwrap();

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = client
            .get(format!("https://127.0.0.1:{}/", port))
            .send()
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(registry.is_empty());
        assert!(client.fingerprint().ja4.is_empty());
        assert_eq!(client.client_random(), "0".repeat(64));
    }
}
