//! HTTP version preference.

/// Which HTTP version a client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpVersion {
    /// Always HTTP/1.1.
    Http1_1,
    /// HTTP/2; fails if the server does not negotiate `h2`.
    Http2,
    /// Follow the ALPN result.
    #[default]
    Auto,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http1_1 => "HTTP/1.1",
            Self::Http2 => "HTTP/2",
            Self::Auto => "Auto",
        }
    }

    /// ALPN protocols to offer for this preference, narrowed from the
    /// profile's list.
    pub fn alpn_protocols(&self, offered: &[String]) -> Vec<String> {
        let keep = |p: &String| match self {
            Self::Http1_1 => p == "http/1.1",
            Self::Http2 => p == "h2",
            Self::Auto => true,
        };
        offered.iter().filter(|p| keep(p)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpn_narrowing() {
        let offered = vec!["h2".to_string(), "http/1.1".to_string()];
        assert_eq!(HttpVersion::Auto.alpn_protocols(&offered), offered);
        assert_eq!(HttpVersion::Http1_1.alpn_protocols(&offered), vec!["http/1.1"]);
        assert_eq!(HttpVersion::Http2.alpn_protocols(&offered), vec!["h2"]);
    }
}
