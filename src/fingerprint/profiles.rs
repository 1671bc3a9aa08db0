//! Browser identity profiles.
//!
//! Profiles are immutable static descriptors; sessions hold them by
//! reference and never mutate them.

use super::http2::Http2Settings;
use super::ja3::Ja3Template;

/// Engine family, which selects the HTTP/2 preset and default headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserFamily {
    Chromium,
    Firefox,
    Safari,
}

impl BrowserFamily {
    /// HTTP/2 preset for this family.
    pub fn http2_settings(self) -> Http2Settings {
        match self {
            Self::Chromium => Http2Settings::chromium(),
            Self::Firefox => Http2Settings::firefox(),
            Self::Safari => Http2Settings::safari(),
        }
    }

    /// Family for a profile name. Unrecognised names are treated as Chromium.
    pub fn for_profile_name(name: &str) -> Self {
        match get(name) {
            Some(profile) => profile.family,
            None => Self::Chromium,
        }
    }
}

/// One browser identity's TLS and header behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub family: BrowserFamily,
    pub tls_version_min: u16,
    pub tls_version_max: u16,
    pub cipher_suites: &'static [u16],
    pub curves: &'static [u16],
    pub signature_algorithms: &'static [u16],
    pub alpn_protocols: &'static [&'static str],
    pub grease: bool,
    pub ja3: &'static str,
    pub user_agent: &'static str,
    pub accept: &'static str,
    pub accept_language: &'static str,
    pub accept_encoding: &'static str,
    pub header_order: &'static [&'static str],
    pub sec_headers: &'static [(&'static str, &'static str)],
}

impl Ja3Template for Profile {
    fn ja3(&self) -> &str {
        self.ja3
    }

    fn alpn_protocols(&self) -> &[&str] {
        self.alpn_protocols
    }
}

const TLS12: u16 = 0x0303;
const TLS13: u16 = 0x0304;
const ALPN: &[&str] = &["h2", "http/1.1"];

const CHROME_CIPHERS: &[u16] = &[
    4865, 4866, 4867, 49195, 49199, 49196, 49200, 52393, 52392, 49171, 49172, 156, 157, 47, 53,
];
const CHROME_CURVES: &[u16] = &[29, 23, 24];
const CHROME_PQ_CURVES: &[u16] = &[4588, 29, 23, 24];
const CHROME_SIGALGS: &[u16] = &[
    0x0403, 0x0804, 0x0401, 0x0503, 0x0805, 0x0501, 0x0806, 0x0601,
];
const CHROME_120_JA3: &str = "771,4865-4866-4867-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-17513-21,29-23-24,0";
const CHROME_131_JA3: &str = "771,4865-4866-4867-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-17513-65037-21,4588-29-23-24,0";
const CHROME_138_JA3: &str = "771,4865-4866-4867-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-17613-65037-21,4588-29-23-24,0";
const CHROME_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const CHROME_HEADER_ORDER: &[&str] = &[
    ":method",
    ":authority",
    ":scheme",
    ":path",
    "sec-ch-ua",
    "sec-ch-ua-mobile",
    "sec-ch-ua-platform",
    "DNT",
    "Upgrade-Insecure-Requests",
    "User-Agent",
    "Accept",
    "Sec-Fetch-Site",
    "Sec-Fetch-Mode",
    "Sec-Fetch-User",
    "Sec-Fetch-Dest",
    "Accept-Encoding",
    "Accept-Language",
];

const FIREFOX_CIPHERS: &[u16] = &[
    4865, 4867, 4866, 49195, 49199, 52393, 52392, 49196, 49200, 49162, 49161, 49171, 49172, 156,
    157, 47, 53,
];
const FIREFOX_CURVES: &[u16] = &[29, 23, 24, 25, 256, 257];
const FIREFOX_SIGALGS: &[u16] = &[
    0x0403, 0x0503, 0x0603, 0x0804, 0x0805, 0x0806, 0x0401, 0x0501, 0x0601, 0x0203, 0x0201,
];
const FIREFOX_121_JA3: &str = "771,4865-4867-4866-49195-49199-52393-52392-49196-49200-49162-49161-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-34-51-43-13-45-28-21,29-23-24-25-256-257,0";
const FIREFOX_131_JA3: &str = "771,4865-4867-4866-49195-49199-52393-52392-49196-49200-49162-49161-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-34-51-43-13-45-28-27-65037,4588-29-23-24-25-256-257,0";
const MULLVAD_JA3: &str = "771,4865-4867-4866-49195-49199-52393-52392-49196-49200-49162-49161-49171-49172-156-157-47-53,0-23-65281-10-11-16-5-34-51-43-13-45-28-21,29-23-24-25-256-257,0";
const FIREFOX_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const FIREFOX_HEADER_ORDER: &[&str] = &[
    ":method",
    ":path",
    ":authority",
    ":scheme",
    "User-Agent",
    "Accept",
    "Accept-Language",
    "Accept-Encoding",
    "DNT",
    "Upgrade-Insecure-Requests",
    "Sec-Fetch-Dest",
    "Sec-Fetch-Mode",
    "Sec-Fetch-Site",
    "Sec-Fetch-User",
];
const FIREFOX_SEC_HEADERS: &[(&str, &str)] = &[
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
];

const SAFARI_CIPHERS: &[u16] = &[
    4865, 4866, 4867, 49196, 49195, 52393, 49200, 49199, 52392, 49162, 49161, 49172, 49171, 157,
    156, 53, 47, 49160, 49170, 10,
];
const SAFARI_CURVES: &[u16] = &[29, 23, 24, 25];
const SAFARI_SIGALGS: &[u16] = &[
    0x0403, 0x0804, 0x0401, 0x0503, 0x0203, 0x0805, 0x0501, 0x0806, 0x0601, 0x0201,
];
const SAFARI_JA3: &str = "771,4865-4866-4867-49196-49195-52393-49200-49199-52392-49162-49161-49172-49171-157-156-53-47-49160-49170-10,0-23-65281-10-11-16-5-13-18-51-45-43-27-21,29-23-24-25,0";
const SAFARI_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const SAFARI_HEADER_ORDER: &[&str] = &[
    ":method",
    ":scheme",
    ":path",
    ":authority",
    "Accept",
    "Sec-Fetch-Site",
    "Sec-Fetch-Dest",
    "Accept-Language",
    "Sec-Fetch-Mode",
    "User-Agent",
    "Upgrade-Insecure-Requests",
    "Accept-Encoding",
];
const SAFARI_SEC_HEADERS: &[(&str, &str)] = &[
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
];

const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const FIREFOX_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
const CHROME_ACCEPT_ENCODING: &str = "gzip, deflate, br, zstd";
const SAFARI_ACCEPT_ENCODING: &str = "gzip, deflate, br";

const fn chromium(
    name: &'static str,
    ja3: &'static str,
    curves: &'static [u16],
    user_agent: &'static str,
    sec_headers: &'static [(&'static str, &'static str)],
) -> Profile {
    Profile {
        name,
        family: BrowserFamily::Chromium,
        tls_version_min: TLS12,
        tls_version_max: TLS13,
        cipher_suites: CHROME_CIPHERS,
        curves,
        signature_algorithms: CHROME_SIGALGS,
        alpn_protocols: ALPN,
        grease: true,
        ja3,
        user_agent,
        accept: CHROME_ACCEPT,
        accept_language: ACCEPT_LANGUAGE,
        accept_encoding: CHROME_ACCEPT_ENCODING,
        header_order: CHROME_HEADER_ORDER,
        sec_headers,
    }
}

const fn firefox(name: &'static str, ja3: &'static str, user_agent: &'static str) -> Profile {
    Profile {
        name,
        family: BrowserFamily::Firefox,
        tls_version_min: TLS12,
        tls_version_max: TLS13,
        cipher_suites: FIREFOX_CIPHERS,
        curves: FIREFOX_CURVES,
        signature_algorithms: FIREFOX_SIGALGS,
        alpn_protocols: ALPN,
        grease: false,
        ja3,
        user_agent,
        accept: FIREFOX_ACCEPT,
        accept_language: FIREFOX_ACCEPT_LANGUAGE,
        accept_encoding: CHROME_ACCEPT_ENCODING,
        header_order: FIREFOX_HEADER_ORDER,
        sec_headers: FIREFOX_SEC_HEADERS,
    }
}

const fn safari(name: &'static str, user_agent: &'static str) -> Profile {
    Profile {
        name,
        family: BrowserFamily::Safari,
        tls_version_min: TLS12,
        tls_version_max: TLS13,
        cipher_suites: SAFARI_CIPHERS,
        curves: SAFARI_CURVES,
        signature_algorithms: SAFARI_SIGALGS,
        alpn_protocols: ALPN,
        grease: true,
        ja3: SAFARI_JA3,
        user_agent,
        accept: SAFARI_ACCEPT,
        accept_language: ACCEPT_LANGUAGE,
        accept_encoding: SAFARI_ACCEPT_ENCODING,
        header_order: SAFARI_HEADER_ORDER,
        sec_headers: SAFARI_SEC_HEADERS,
    }
}

static PROFILES: &[Profile] = &[
    chromium(
        "Chrome120",
        CHROME_120_JA3,
        CHROME_CURVES,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        &[
            ("sec-ch-ua", r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", r#""Windows""#),
        ],
    ),
    chromium(
        "Chrome131",
        CHROME_131_JA3,
        CHROME_PQ_CURVES,
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        &[
            ("sec-ch-ua", r#""Google Chrome";v="131", "Chromium";v="131", "Not_A Brand";v="24""#),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", r#""macOS""#),
        ],
    ),
    chromium(
        "Chrome138",
        CHROME_138_JA3,
        CHROME_PQ_CURVES,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36",
        &[
            ("sec-ch-ua", r#""Not)A;Brand";v="8", "Chromium";v="138", "Google Chrome";v="138""#),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", r#""Windows""#),
        ],
    ),
    chromium(
        "ChromeAndroid",
        CHROME_131_JA3,
        CHROME_PQ_CURVES,
        "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36",
        &[
            ("sec-ch-ua", r#""Google Chrome";v="131", "Chromium";v="131", "Not_A Brand";v="24""#),
            ("sec-ch-ua-mobile", "?1"),
            ("sec-ch-ua-platform", r#""Android""#),
        ],
    ),
    chromium(
        "Edge120",
        CHROME_120_JA3,
        CHROME_CURVES,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
        &[
            ("sec-ch-ua", r#""Not_A Brand";v="8", "Chromium";v="120", "Microsoft Edge";v="120""#),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", r#""Windows""#),
        ],
    ),
    chromium(
        "Opera115",
        CHROME_131_JA3,
        CHROME_PQ_CURVES,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36 OPR/115.0.0.0",
        &[
            ("sec-ch-ua", r#""Opera";v="115", "Chromium";v="130", "Not?A_Brand";v="24""#),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", r#""Windows""#),
        ],
    ),
    chromium(
        "Brave131",
        CHROME_131_JA3,
        CHROME_PQ_CURVES,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        &[
            ("sec-ch-ua", r#""Brave";v="131", "Chromium";v="131", "Not_A Brand";v="24""#),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", r#""Windows""#),
        ],
    ),
    chromium(
        "Brave138",
        CHROME_138_JA3,
        CHROME_PQ_CURVES,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36",
        &[
            ("sec-ch-ua", r#""Not)A;Brand";v="8", "Chromium";v="138", "Brave";v="138""#),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", r#""Windows""#),
        ],
    ),
    firefox(
        "Firefox121",
        FIREFOX_121_JA3,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    ),
    firefox(
        "Firefox131",
        FIREFOX_131_JA3,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:131.0) Gecko/20100101 Firefox/131.0",
    ),
    firefox(
        "MullvadBrowser",
        MULLVAD_JA3,
        "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0",
    ),
    safari(
        "Safari17",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    ),
    safari(
        "Safari18",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    ),
    safari(
        "SafariIOS",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
    ),
];

/// Profile used when none is configured.
pub const DEFAULT_PROFILE: &str = "Chrome131";

/// Look up a profile by name.
pub fn get(name: &str) -> Option<&'static Profile> {
    PROFILES.iter().find(|p| p.name == name)
}

/// Names of every built-in profile.
pub fn names() -> impl Iterator<Item = &'static str> {
    PROFILES.iter().map(|p| p.name)
}

/// Every built-in profile.
pub fn all() -> &'static [Profile] {
    PROFILES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::ja3::{ja3_hash, parse_ja3};

    #[test]
    fn test_lookup() {
        assert_eq!(get("Firefox121").map(|p| p.family), Some(BrowserFamily::Firefox));
        assert!(get("Netscape4").is_none());
        assert!(get(DEFAULT_PROFILE).is_some());
        assert_eq!(names().count(), all().len());
    }

    #[test]
    fn test_templates_parse_and_match_cipher_lists() {
        for profile in all() {
            let fields = parse_ja3(profile.ja3)
                .unwrap_or_else(|e| panic!("{}: {}", profile.name, e));
            assert_eq!(fields.cipher_suites, profile.cipher_suites, "{}", profile.name);
            assert_eq!(fields.supported_groups, profile.curves, "{}", profile.name);
            assert_eq!(fields.tls_version, TLS12, "{}", profile.name);
        }
    }

    #[test]
    fn test_shared_templates_share_hashes() {
        let chrome = get("Chrome131").unwrap();
        let brave = get("Brave131").unwrap();
        assert_eq!(ja3_hash(chrome.ja3), ja3_hash(brave.ja3));

        let chrome120 = get("Chrome120").unwrap();
        assert_ne!(ja3_hash(chrome.ja3), ja3_hash(chrome120.ja3));
    }

    #[test]
    fn test_distinct_templates_distinct_hashes() {
        let mut templates: Vec<&str> = all().iter().map(|p| p.ja3).collect();
        templates.sort();
        templates.dedup();
        let mut hashes: Vec<String> = templates.iter().map(|t| ja3_hash(t)).collect();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), templates.len());
    }

    #[test]
    fn test_family_for_name() {
        assert_eq!(BrowserFamily::for_profile_name("Safari18"), BrowserFamily::Safari);
        assert_eq!(BrowserFamily::for_profile_name("MullvadBrowser"), BrowserFamily::Firefox);
        assert_eq!(BrowserFamily::for_profile_name("Unknown"), BrowserFamily::Chromium);
    }
}
