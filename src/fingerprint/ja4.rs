//! JA4 and JA4_R fingerprint strings.
//!
//! Both share the `t<version><alpn>` prefix. JA4 sorts the cipher and
//! extension codes; JA4_R keeps negotiation order and appends the
//! supported groups.

/// Stands where published JA4 puts the cipher/extension counts.
///
/// Kept constant so fingerprints stay comparable with records produced by
/// earlier releases.
pub const JA4_COUNT_PLACEHOLDER: &str = "1516";

/// Two-character TLS version tag.
pub fn version_tag(tls_version: u16) -> &'static str {
    match tls_version {
        0x0303 => "12",
        0x0302 => "11",
        _ => "13",
    }
}

/// ALPN class: `h2`, `h1`, or `d` when neither is offered.
pub fn alpn_tag<S: AsRef<str>>(alpn_protocols: &[S]) -> &'static str {
    let offers = |proto: &str| alpn_protocols.iter().any(|p| p.as_ref() == proto);
    if offers("h2") {
        "h2"
    } else if offers("http/1.1") {
        "h1"
    } else {
        "d"
    }
}

fn hex_codes(ids: &[u16]) -> Vec<String> {
    ids.iter().map(|id| format!("{:04x}", id)).collect()
}

/// JA4: `t<ver><alpn><count>_<sorted ciphers>_<sorted extensions>`.
pub fn ja4<S: AsRef<str>>(
    tls_version: u16,
    cipher_suites: &[u16],
    extensions: &[u16],
    _supported_groups: &[u16],
    alpn_protocols: &[S],
) -> String {
    let mut ciphers = hex_codes(cipher_suites);
    ciphers.sort();
    let mut exts = hex_codes(extensions);
    exts.sort();

    format!(
        "t{}{}{}_{}_{}",
        version_tag(tls_version),
        alpn_tag(alpn_protocols),
        JA4_COUNT_PLACEHOLDER,
        ciphers.join(","),
        exts.join(",")
    )
}

/// JA4_R: `t<ver><alpn>_<ciphers>_<extensions>_<groups>`, unsorted.
pub fn ja4r<S: AsRef<str>>(
    tls_version: u16,
    cipher_suites: &[u16],
    extensions: &[u16],
    supported_groups: &[u16],
    alpn_protocols: &[S],
) -> String {
    format!(
        "t{}{}_{}_{}_{}",
        version_tag(tls_version),
        alpn_tag(alpn_protocols),
        hex_codes(cipher_suites).join(","),
        hex_codes(extensions).join(","),
        hex_codes(supported_groups).join(",")
    )
}
