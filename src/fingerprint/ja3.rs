//! JA3 template parsing and hashing.
//!
//! JA3 string: `SSLVersion,Ciphers,Extensions,EllipticCurves,EcPointFormats`,
//! values in decimal, list entries joined with `-`.

use md5::{Digest, Md5};

use crate::error::{Error, Result};

/// Capability required from anything the assembler fingerprints.
pub trait Ja3Template {
    /// The static JA3 template string.
    fn ja3(&self) -> &str;

    /// ALPN protocols offered by this identity, used when the connection
    /// record does not carry any.
    fn alpn_protocols(&self) -> &[&str] {
        &[]
    }
}

/// The five fields of a JA3 string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ja3Fields {
    pub tls_version: u16,
    pub cipher_suites: Vec<u16>,
    pub extensions: Vec<u16>,
    pub supported_groups: Vec<u16>,
    pub ec_point_formats: Vec<u16>,
}

/// Parse a JA3 string into its fields.
///
/// An empty list field yields an empty list. Anything other than exactly
/// five fields, or a token that is not a 16-bit decimal integer, is a
/// [`Error::Format`].
pub fn parse_ja3(ja3: &str) -> Result<Ja3Fields> {
    let parts: Vec<&str> = ja3.split(',').collect();
    if parts.len() != 5 {
        return Err(Error::format(format!(
            "expected 5 comma-separated fields, got {}",
            parts.len()
        )));
    }

    let tls_version = parts[0]
        .parse::<u16>()
        .map_err(|e| Error::format(format!("invalid TLS version {:?}: {}", parts[0], e)))?;

    Ok(Ja3Fields {
        tls_version,
        cipher_suites: parse_list(parts[1], "cipher suite")?,
        extensions: parse_list(parts[2], "extension")?,
        supported_groups: parse_list(parts[3], "supported group")?,
        ec_point_formats: parse_list(parts[4], "EC point format")?,
    })
}

fn parse_list(field: &str, kind: &str) -> Result<Vec<u16>> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split('-')
        .map(|token| {
            token
                .parse::<u16>()
                .map_err(|e| Error::format(format!("invalid {} id {:?}: {}", kind, token, e)))
        })
        .collect()
}

/// Lower-case hex MD5 of an arbitrary fingerprint string.
///
/// MD5 is what the JA3 ecosystem standardised on; it is used here for
/// interoperability only.
pub fn md5_hex(s: &str) -> String {
    hex::encode(Md5::digest(s.as_bytes()))
}

/// JA3 hash of a raw JA3 string.
pub fn ja3_hash(ja3: &str) -> String {
    md5_hex(ja3)
}
