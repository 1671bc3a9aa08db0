//! HTTP response with content decoding and the request's fingerprint.

use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::fingerprint::FingerprintData;

/// A completed response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// `name: value` lines as received.
    pub headers: Vec<String>,
    body: Bytes,
    http_version: String,
    fingerprint: Arc<FingerprintData>,
}

impl Response {
    pub fn new(
        status: u16,
        headers: Vec<String>,
        body: Bytes,
        http_version: impl Into<String>,
        fingerprint: Arc<FingerprintData>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            http_version: http_version.into(),
            fingerprint,
        }
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    fn header_values<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a str> + use<'a, 'b> {
        self.headers.iter().filter_map(move |line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    /// Every value of a repeated header.
    pub fn headers_named(&self, name: &str) -> Vec<&str> {
        self.header_values(name).collect()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.header("Content-Encoding")
    }

    /// Body decoded per Content-Encoding (gzip, deflate, br, zstd).
    pub fn decoded_body(&self) -> Result<Bytes> {
        let encoding = self.content_encoding().map(str::to_ascii_lowercase);
        match encoding.as_deref() {
            Some("gzip") | Some("x-gzip") => decode_gzip(&self.body),
            Some("deflate") => decode_deflate(&self.body),
            Some("br") => decode_brotli(&self.body),
            Some("zstd") => decode_zstd(&self.body),
            _ => Ok(self.body.clone()),
        }
    }

    pub fn text(&self) -> Result<String> {
        let decoded = self.decoded_body()?;
        String::from_utf8(decoded.to_vec())
            .map_err(|e| Error::Decompression(format!("UTF-8 decode error: {}", e)))
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let text = self.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fingerprint assembled for the request that produced this response.
    pub fn fingerprint(&self) -> &FingerprintData {
        &self.fingerprint
    }

    pub fn ja3(&self) -> &str {
        &self.fingerprint.ja3
    }

    pub fn ja3_hash(&self) -> &str {
        &self.fingerprint.ja3_hash
    }

    pub fn ja4(&self) -> &str {
        &self.fingerprint.ja4
    }

    pub fn ja4_r(&self) -> &str {
        &self.fingerprint.ja4_r
    }

    pub fn peet_print(&self) -> &str {
        &self.fingerprint.peet_print
    }

    pub fn akamai_fingerprint(&self) -> &str {
        &self.fingerprint.akamai_fingerprint
    }

    pub fn client_random(&self) -> &str {
        &self.fingerprint.client_random
    }

    pub fn session_id(&self) -> &str {
        &self.fingerprint.session_id
    }
}

fn decode_gzip(data: &[u8]) -> Result<Bytes> {
    let mut decoded = Vec::new();
    flate2::read::GzDecoder::new(data)
        .read_to_end(&mut decoded)
        .map_err(|e| Error::Decompression(format!("gzip: {}", e)))?;
    Ok(Bytes::from(decoded))
}

// Servers send both zlib-wrapped and raw deflate.
fn decode_deflate(data: &[u8]) -> Result<Bytes> {
    let mut decoded = Vec::new();
    if flate2::read::ZlibDecoder::new(data).read_to_end(&mut decoded).is_ok() {
        return Ok(Bytes::from(decoded));
    }
    decoded.clear();
    flate2::read::DeflateDecoder::new(data)
        .read_to_end(&mut decoded)
        .map_err(|e| Error::Decompression(format!("deflate: {}", e)))?;
    Ok(Bytes::from(decoded))
}

fn decode_brotli(data: &[u8]) -> Result<Bytes> {
    let mut decoded = Vec::new();
    brotli::Decompressor::new(data, 4096)
        .read_to_end(&mut decoded)
        .map_err(|e| Error::Decompression(format!("brotli: {}", e)))?;
    Ok(Bytes::from(decoded))
}

fn decode_zstd(data: &[u8]) -> Result<Bytes> {
    zstd::stream::decode_all(data)
        .map(Bytes::from)
        .map_err(|e| Error::Decompression(format!("zstd: {}", e)))
}
