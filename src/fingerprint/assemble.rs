//! Combines a profile, captured TLS details and the HTTP/2 aggregate into
//! one [`FingerprintData`].

use super::data::{Extension, FingerprintData, Http2Data};
use super::http2::{akamai_fingerprint, akamai_hash, CONNECTION_PREFACE};
use super::ja3::{ja3_hash, parse_ja3, Ja3Template};
use super::ja4::{ja4, ja4r};
use super::names::{cipher_suite_name, extension_name, signature_algorithm_name, supported_group_name};
use super::peet::{peet_print, peet_print_hash};
use crate::tracking::registry::ConnectionDetails;

/// Length of the zero placeholder used for client-random and session-id.
const PLACEHOLDER_LEN: usize = 32;

/// Build the fingerprint record for one request.
///
/// Never fails: without connection details, or when the profile's JA3
/// template does not parse, only the template-derived JA3 fields are
/// filled and client-random/session-id are zero placeholders.
pub fn assemble<P>(profile: &P, details: Option<&ConnectionDetails>) -> FingerprintData
where
    P: Ja3Template + ?Sized,
{
    let Some(details) = details else {
        tracing::debug!("no connection details, using fallback fingerprint");
        return fallback(profile);
    };

    let template = profile.ja3();
    let fields = match parse_ja3(template) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(error = %e, "JA3 template did not parse, using fallback fingerprint");
            return fallback(profile);
        }
    };

    let negotiated = if details.tls_version != 0 {
        details.tls_version
    } else {
        fields.tls_version
    };
    let alpn: Vec<&str> = if details.alpn_protocols.is_empty() {
        profile.alpn_protocols().to_vec()
    } else {
        details.alpn_protocols.iter().map(String::as_str).collect()
    };

    let ciphers = &fields.cipher_suites;
    let extensions = &fields.extensions;
    let groups = &fields.supported_groups;

    let peet = peet_print(
        negotiated,
        fields.tls_version,
        ciphers,
        extensions,
        groups,
        &details.signature_algorithms,
    );

    let mut data = FingerprintData {
        tls_version: negotiated.to_string(),
        tls_version_record: fields.tls_version.to_string(),
        tls_version_negotiated: negotiated.to_string(),
        cipher_suites: ciphers.iter().copied().map(cipher_suite_name).collect(),
        extensions: extensions
            .iter()
            .map(|&id| Extension { id, name: extension_name(id) })
            .collect(),
        supported_groups: groups.iter().copied().map(supported_group_name).collect(),
        signature_algorithms: details
            .signature_algorithms
            .iter()
            .copied()
            .map(signature_algorithm_name)
            .collect(),
        ja3: template.to_string(),
        ja3_hash: ja3_hash(template),
        ja4: ja4(negotiated, ciphers, extensions, groups, &alpn),
        ja4_r: ja4r(negotiated, ciphers, extensions, groups, &alpn),
        peet_print_hash: peet_print_hash(&peet),
        peet_print: peet,
        client_random: hex::encode(&details.client_random),
        session_id: hex::encode(&details.session_id),
        ..FingerprintData::default()
    };

    if !details.http2_settings.is_empty() {
        let akamai = akamai_fingerprint(&details.http2_settings, details.http2_window_update);
        let akamai_digest = akamai_hash(&akamai);
        data.http2 = Some(Http2Data {
            settings: details.http2_settings.clone(),
            window_update: details.http2_window_update,
            header_priority: details.http2_priority,
            sent_frames: details.http2_frames.clone(),
            connection_preface: CONNECTION_PREFACE.to_string(),
            akamai_fingerprint: akamai.clone(),
            akamai_fingerprint_hash: akamai_digest.clone(),
        });
        data.akamai_fingerprint = akamai;
        data.akamai_fingerprint_hash = akamai_digest;
    }

    tracing::debug!(ja3_hash = %data.ja3_hash, ja4 = %data.ja4, "assembled fingerprint");
    data
}

fn fallback<P: Ja3Template + ?Sized>(profile: &P) -> FingerprintData {
    let placeholder = hex::encode([0u8; PLACEHOLDER_LEN]);
    FingerprintData {
        ja3: profile.ja3().to_string(),
        ja3_hash: ja3_hash(profile.ja3()),
        client_random: placeholder.clone(),
        session_id: placeholder,
        ..FingerprintData::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::http2::{Frame, SettingId, Settings};

    struct Template(&'static str);

    impl Ja3Template for Template {
        fn ja3(&self) -> &str {
            self.0
        }

        fn alpn_protocols(&self) -> &[&str] {
            &["h2", "http/1.1"]
        }
    }

    fn tls13_details() -> ConnectionDetails {
        ConnectionDetails {
            tls_version: 0x0304,
            cipher_suite: 0x1301,
            client_random: vec![0xab; 32],
            session_id: vec![0x01, 0x02],
            signature_algorithms: vec![0x0403, 0x0804],
            handshake_complete: true,
            ..ConnectionDetails::new("example.com")
        }
    }

    #[test]
    fn test_fallback_without_details() {
        let data = assemble(&Template("771,4865-4866,0-23,29-23,0"), None);
        assert_eq!(data.ja3, "771,4865-4866,0-23,29-23,0");
        assert_eq!(data.ja3_hash, "40a8d16d28297af652a24c22c97c89a8");
        assert_eq!(data.client_random, "0".repeat(64));
        assert_eq!(data.session_id, "0".repeat(64));
        assert!(data.ja4.is_empty());
        assert!(data.http2.is_none());
    }

    #[test]
    fn test_bad_template_degrades_to_fallback() {
        let data = assemble(&Template("771,4865"), Some(&tls13_details()));
        assert_eq!(data.ja3, "771,4865");
        assert_eq!(data.client_random, "0".repeat(64));
        assert!(data.peet_print.is_empty());
    }

    #[test]
    fn test_full_record() {
        let data = assemble(&Template("771,4865-4866,0-23,29-23,0"), Some(&tls13_details()));

        assert_eq!(data.tls_version, "772");
        assert_eq!(data.tls_version_record, "771");
        assert_eq!(data.ja4, "t13h21516_1301,1302_0000,0017");
        assert_eq!(data.ja4_r, "t13h2_1301,1302_0000,0017_001d,0017");
        assert_eq!(data.peet_print, "772-771|29-23|1027-2052|0-23|4865-4866");
        assert_eq!(data.cipher_suites, vec!["TLS_AES_128_GCM_SHA256", "TLS_AES_256_GCM_SHA384"]);
        assert_eq!(data.extensions[1].name, "extended_master_secret");
        assert_eq!(data.supported_groups, vec!["x25519", "secp256r1"]);
        assert_eq!(data.signature_algorithms[1], "rsa_pss_rsae_sha256");
        assert_eq!(data.client_random, "ab".repeat(32));
        assert_eq!(data.session_id, "0102");
        assert!(data.akamai_fingerprint.is_empty());
    }

    #[test]
    fn test_version_falls_back_to_template() {
        let details = ConnectionDetails { tls_version: 0, ..tls13_details() };
        let data = assemble(&Template("771,4865,0,29,0"), Some(&details));
        assert!(data.ja4.starts_with("t12h2"));
        assert_eq!(data.tls_version_negotiated, "771");
    }

    #[test]
    fn test_offered_alpn_overrides_profile() {
        let details = ConnectionDetails {
            alpn_protocols: vec!["http/1.1".to_string()],
            ..tls13_details()
        };
        let data = assemble(&Template("771,4865,0,29,0"), Some(&details));
        assert!(data.ja4.starts_with("t13h1"));
    }

    #[test]
    fn test_http2_section() {
        let details = ConnectionDetails {
            http2_settings: Settings::from([
                (SettingId::HeaderTableSize, 65536),
                (SettingId::EnablePush, 0),
            ]),
            http2_window_update: 1073741824,
            http2_frames: vec![Frame::window_update(1073741824)],
            ..tls13_details()
        };
        let data = assemble(&Template("771,4865,0,29,0"), Some(&details));

        assert!(data.akamai_fingerprint.starts_with("1:65536;2:0|1073741824|0|m,a,p,s"));
        assert_eq!(data.akamai_fingerprint_hash, "7c913f29710b6d21562ab1815ada2a00");
        let http2 = data.http2.unwrap();
        assert_eq!(http2.connection_preface, "PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n");
        assert_eq!(http2.sent_frames.len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let details = tls13_details();
        let template = Template("771,4865-4866-4867,0-23-65281,29-23-24,0");
        assert_eq!(assemble(&template, Some(&details)), assemble(&template, Some(&details)));
    }
}
