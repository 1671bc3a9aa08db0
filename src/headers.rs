//! Ordered request headers and browser default headers.

use crate::error::{Error, Result};
use crate::fingerprint::profiles::{BrowserFamily, Profile};

/// Header list that keeps insertion order and treats names
/// case-insensitively. Names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedHeaders {
    entries: Vec<(String, String)>,
}

impl OrderedHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing the value in place if the name exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        self.entries.retain(|(n, _)| *n != name);
    }

    pub fn set_many<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.set(name.as_ref(), value);
        }
    }

    /// Set headers from `[name, value]` pairs.
    pub fn set_from_pairs<S: AsRef<str>>(&mut self, pairs: &[Vec<S>]) -> Result<()> {
        for pair in pairs {
            match pair.as_slice() {
                [name, value] => self.set(name.as_ref(), value.as_ref()),
                _ => {
                    return Err(Error::invalid_header(format!(
                        "expected [name, value], got {} elements",
                        pair.len()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Set headers from `"Name: value"` lines.
    pub fn set_from_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        for line in lines {
            let line = line.as_ref();
            let (name, value) = line.split_once(':').ok_or_else(|| {
                Error::invalid_header(format!("{:?} is not of the form 'name: value'", line))
            })?;
            self.set(name.trim(), value.trim());
        }
        Ok(())
    }

    /// Set headers from a JSON object of string values.
    pub fn set_from_json(&mut self, json: &str) -> Result<()> {
        let headers: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        for (name, value) in headers {
            let value = value
                .as_str()
                .ok_or_else(|| Error::invalid_header(format!("value of {:?} is not a string", name)))?
                .to_string();
            self.set(&name, value);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Copy of the entries in insertion order.
    pub fn to_vec(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }
}

/// Value a profile sends for `name` on a request with `method`, if any.
fn profile_header_value(profile: &Profile, method: &str, name: &str) -> Option<String> {
    if let Some((_, value)) = profile
        .sec_headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
    {
        return Some(value.to_string());
    }

    let lower = name.to_ascii_lowercase();
    let value = match lower.as_str() {
        "user-agent" => profile.user_agent,
        "accept" => profile.accept,
        "accept-language" => profile.accept_language,
        "accept-encoding" => profile.accept_encoding,
        "upgrade-insecure-requests" => "1",
        "dnt" if profile.family != BrowserFamily::Safari => "1",
        _ if profile.family == BrowserFamily::Chromium => {
            return chromium_fetch_metadata(method, &lower).map(str::to_string)
        }
        _ => return None,
    };
    Some(value.to_string())
}

// Chromium navigates on GET and issues same-origin fetches otherwise.
fn chromium_fetch_metadata(method: &str, name: &str) -> Option<&'static str> {
    let navigate = method.eq_ignore_ascii_case("GET");
    match (name, navigate) {
        ("sec-fetch-site", true) => Some("none"),
        ("sec-fetch-mode", true) => Some("navigate"),
        ("sec-fetch-user", true) => Some("?1"),
        ("sec-fetch-dest", true) => Some("document"),
        ("sec-fetch-site", false) => Some("same-origin"),
        ("sec-fetch-mode", false) => Some("cors"),
        ("sec-fetch-dest", false) => Some("empty"),
        _ => None,
    }
}

/// The profile's default headers in its header order, pseudo-headers
/// excluded.
pub fn profile_headers(profile: &Profile, method: &str) -> OrderedHeaders {
    let mut headers = OrderedHeaders::new();
    for name in profile.header_order.iter().filter(|n| !n.starts_with(':')) {
        if let Some(value) = profile_header_value(profile, method, name) {
            headers.set(name, value);
        }
    }
    headers
}

/// Headers for one outbound request.
///
/// Without per-request headers the profile defaults are sent in profile
/// order, overridden by the session's custom headers. With per-request
/// headers the session's custom headers come first, then the request's,
/// and only the `User-Agent` and `Accept*` defaults are filled in.
pub fn request_headers(
    profile: &Profile,
    custom: &OrderedHeaders,
    request: &OrderedHeaders,
    method: &str,
) -> OrderedHeaders {
    if request.is_empty() {
        let mut headers = profile_headers(profile, method);
        headers.set_many(custom.iter());
        return headers;
    }

    let mut headers = custom.clone();
    headers.set_many(request.iter());
    for (name, value) in [
        ("User-Agent", profile.user_agent),
        ("Accept", profile.accept),
        ("Accept-Language", profile.accept_language),
        ("Accept-Encoding", profile.accept_encoding),
    ] {
        if !headers.contains(name) {
            headers.set(name, value);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::profiles;

    #[test]
    fn test_set_replaces_in_place() {
        let mut headers = OrderedHeaders::new();
        headers.set("X-First", "1");
        headers.set("X-Second", "2");
        headers.set("x-first", "3");

        assert_eq!(
            headers.to_vec(),
            vec![
                ("x-first".to_string(), "3".to_string()),
                ("x-second".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(headers.get("X-FIRST"), Some("3"));

        headers.remove("X-First");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_parse_inputs() {
        let mut headers = OrderedHeaders::new();
        headers.set_from_lines(&["Accept: text/html", "X-Token:  abc "]).unwrap();
        headers.set_from_pairs(&[vec!["X-Pair", "1"]]).unwrap();
        headers.set_from_json(r#"{"X-Json": "yes"}"#).unwrap();

        assert_eq!(headers.get("x-token"), Some("abc"));
        assert_eq!(headers.get("x-pair"), Some("1"));
        assert_eq!(headers.get("x-json"), Some("yes"));

        assert!(matches!(
            headers.set_from_lines(&["missing colon"]),
            Err(Error::InvalidHeader(_))
        ));
        assert!(headers.set_from_pairs(&[vec!["only-name"]]).is_err());
        assert!(matches!(headers.set_from_json("[1]"), Err(Error::Json(_))));
        assert!(headers.set_from_json(r#"{"X-Num": 1}"#).is_err());
    }

    #[test]
    fn test_chromium_navigation_headers() {
        let chrome = profiles::get("Chrome131").unwrap();
        let headers = profile_headers(chrome, "GET");

        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names[0], "sec-ch-ua");
        assert_eq!(headers.get("sec-fetch-mode"), Some("navigate"));
        assert_eq!(headers.get("sec-fetch-user"), Some("?1"));
        assert_eq!(headers.get("user-agent"), Some(chrome.user_agent));
        assert!(!names.iter().any(|n| n.starts_with(':')));

        let post = profile_headers(chrome, "POST");
        assert_eq!(post.get("sec-fetch-mode"), Some("cors"));
        assert_eq!(post.get("sec-fetch-site"), Some("same-origin"));
        assert!(post.get("sec-fetch-user").is_none());
    }

    #[test]
    fn test_safari_has_no_dnt() {
        let safari = profiles::get("Safari18").unwrap();
        let headers = profile_headers(safari, "GET");
        assert!(headers.get("dnt").is_none());
        assert_eq!(headers.get("sec-fetch-site"), Some("none"));
        assert_eq!(headers.iter().next().map(|(n, _)| n), Some("accept"));
    }

    #[test]
    fn test_request_headers_without_overrides() {
        let firefox = profiles::get("Firefox121").unwrap();
        let mut custom = OrderedHeaders::new();
        custom.set("User-Agent", "custom");

        let headers = request_headers(firefox, &custom, &OrderedHeaders::new(), "GET");
        assert_eq!(headers.get("user-agent"), Some("custom"));
        assert_eq!(headers.iter().next().map(|(n, _)| n), Some("user-agent"));
        assert_eq!(headers.get("dnt"), Some("1"));
    }

    #[test]
    fn test_request_headers_with_overrides() {
        let chrome = profiles::get("Chrome131").unwrap();
        let mut custom = OrderedHeaders::new();
        custom.set("X-Session", "s");
        let mut request = OrderedHeaders::new();
        request.set("Accept", "application/json");

        let headers = request_headers(chrome, &custom, &request, "GET");
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["x-session", "accept", "user-agent", "accept-language", "accept-encoding"]
        );
        assert_eq!(headers.get("accept"), Some("application/json"));
        assert!(headers.get("sec-fetch-mode").is_none());
    }
}
