//! Id → name tables for TLS parameters.
//!
//! Unknown ids never fail; they render as `UNKNOWN_<KIND>_<id>`.

/// Cipher suites: (id, IANA name, BoringSSL cipher-string name).
///
/// TLS 1.3 suites have no cipher-string name: BoringSSL always enables them.
pub const CIPHER_SUITES: &[(u16, &str, Option<&str>)] = &[
    (0x1301, "TLS_AES_128_GCM_SHA256", None),
    (0x1302, "TLS_AES_256_GCM_SHA384", None),
    (0x1303, "TLS_CHACHA20_POLY1305_SHA256", None),
    (0x1304, "TLS_AES_128_CCM_SHA256", None),
    (0x1305, "TLS_AES_128_CCM_8_SHA256", None),
    (0x000a, "TLS_RSA_WITH_3DES_EDE_CBC_SHA", Some("DES-CBC3-SHA")),
    (0x002f, "TLS_RSA_WITH_AES_128_CBC_SHA", Some("AES128-SHA")),
    (0x0035, "TLS_RSA_WITH_AES_256_CBC_SHA", Some("AES256-SHA")),
    (0x003c, "TLS_RSA_WITH_AES_128_CBC_SHA256", Some("AES128-SHA256")),
    (0x003d, "TLS_RSA_WITH_AES_256_CBC_SHA256", Some("AES256-SHA256")),
    (0x009c, "TLS_RSA_WITH_AES_128_GCM_SHA256", Some("AES128-GCM-SHA256")),
    (0x009d, "TLS_RSA_WITH_AES_256_GCM_SHA384", Some("AES256-GCM-SHA384")),
    (0xc008, "TLS_ECDHE_ECDSA_WITH_3DES_EDE_CBC_SHA", Some("ECDHE-ECDSA-DES-CBC3-SHA")),
    (0xc009, "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA", Some("ECDHE-ECDSA-AES128-SHA")),
    (0xc00a, "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA", Some("ECDHE-ECDSA-AES256-SHA")),
    (0xc012, "TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA", Some("ECDHE-RSA-DES-CBC3-SHA")),
    (0xc013, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA", Some("ECDHE-RSA-AES128-SHA")),
    (0xc014, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA", Some("ECDHE-RSA-AES256-SHA")),
    (0xc023, "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256", Some("ECDHE-ECDSA-AES128-SHA256")),
    (0xc024, "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384", Some("ECDHE-ECDSA-AES256-SHA384")),
    (0xc027, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256", Some("ECDHE-RSA-AES128-SHA256")),
    (0xc028, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384", Some("ECDHE-RSA-AES256-SHA384")),
    (0xc02b, "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256", Some("ECDHE-ECDSA-AES128-GCM-SHA256")),
    (0xc02c, "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384", Some("ECDHE-ECDSA-AES256-GCM-SHA384")),
    (0xc02f, "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256", Some("ECDHE-RSA-AES128-GCM-SHA256")),
    (0xc030, "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384", Some("ECDHE-RSA-AES256-GCM-SHA384")),
    (0xcca8, "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256", Some("ECDHE-RSA-CHACHA20-POLY1305")),
    (0xcca9, "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256", Some("ECDHE-ECDSA-CHACHA20-POLY1305")),
];

/// Supported groups: (id, display name, BoringSSL curve name).
pub const SUPPORTED_GROUPS: &[(u16, &str, Option<&str>)] = &[
    (0x0017, "secp256r1", Some("P-256")),
    (0x0018, "secp384r1", Some("P-384")),
    (0x0019, "secp521r1", Some("P-521")),
    (0x001d, "x25519", Some("x25519")),
    (0x001e, "x448", None),
    (0x0100, "ffdhe2048", None),
    (0x0101, "ffdhe3072", None),
    (0x11ec, "X25519MLKEM768", None),
];

/// Signature schemes: (id, name). The names double as BoringSSL sigalg names.
pub const SIGNATURE_ALGORITHMS: &[(u16, &str)] = &[
    (0x0201, "rsa_pkcs1_sha1"),
    (0x0203, "ecdsa_sha1"),
    (0x0401, "rsa_pkcs1_sha256"),
    (0x0501, "rsa_pkcs1_sha384"),
    (0x0601, "rsa_pkcs1_sha512"),
    (0x0403, "ecdsa_secp256r1_sha256"),
    (0x0503, "ecdsa_secp384r1_sha384"),
    (0x0603, "ecdsa_secp521r1_sha512"),
    (0x0804, "rsa_pss_rsae_sha256"),
    (0x0805, "rsa_pss_rsae_sha384"),
    (0x0806, "rsa_pss_rsae_sha512"),
    (0x0807, "ed25519"),
    (0x0808, "ed448"),
];

/// Name of a cipher suite id.
pub fn cipher_suite_name(id: u16) -> String {
    CIPHER_SUITES
        .iter()
        .find(|(cid, _, _)| *cid == id)
        .map(|(_, name, _)| (*name).to_string())
        .unwrap_or_else(|| format!("UNKNOWN_CIPHER_0x{:04X}", id))
}

/// Resolve a cipher name reported by BoringSSL (IANA or cipher-string form).
pub fn cipher_suite_id(name: &str) -> Option<u16> {
    CIPHER_SUITES
        .iter()
        .find(|(_, iana, boring)| *iana == name || *boring == Some(name))
        .map(|(id, _, _)| *id)
}

/// Name of a TLS extension id.
pub fn extension_name(id: u16) -> String {
    let name = match id {
        0 => "server_name",
        1 => "max_fragment_length",
        5 => "status_request",
        10 => "supported_groups",
        11 => "ec_point_formats",
        13 => "signature_algorithms",
        16 => "application_layer_protocol_negotiation",
        18 => "signed_certificate_timestamp",
        21 => "padding",
        23 => "extended_master_secret",
        27 => "compressed_certificate",
        28 => "record_size_limit",
        34 => "delegated_credentials",
        35 => "session_ticket",
        41 => "pre_shared_key",
        43 => "supported_versions",
        45 => "psk_key_exchange_modes",
        51 => "key_share",
        17513 => "application_settings",
        17613 => "application_settings_new",
        65037 => "encrypted_client_hello",
        65281 => "renegotiation_info",
        _ => return format!("UNKNOWN_EXTENSION_{}", id),
    };
    name.to_string()
}

/// Name of a supported-group id.
pub fn supported_group_name(id: u16) -> String {
    SUPPORTED_GROUPS
        .iter()
        .find(|(gid, _, _)| *gid == id)
        .map(|(_, name, _)| (*name).to_string())
        .unwrap_or_else(|| format!("UNKNOWN_GROUP_{}", id))
}

/// Name of a signature-algorithm id.
pub fn signature_algorithm_name(id: u16) -> String {
    SIGNATURE_ALGORITHMS
        .iter()
        .find(|(sid, _)| *sid == id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("UNKNOWN_SIG_ALG_{}", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(cipher_suite_name(0x1301), "TLS_AES_128_GCM_SHA256");
        assert_eq!(extension_name(65281), "renegotiation_info");
        assert_eq!(supported_group_name(29), "x25519");
        assert_eq!(supported_group_name(0x11ec), "X25519MLKEM768");
        assert_eq!(signature_algorithm_name(0x0804), "rsa_pss_rsae_sha256");
    }

    #[test]
    fn test_unknown_placeholders() {
        assert_eq!(cipher_suite_name(0x0a0a), "UNKNOWN_CIPHER_0x0A0A");
        assert_eq!(extension_name(2570), "UNKNOWN_EXTENSION_2570");
        assert_eq!(supported_group_name(0x0a0a), "UNKNOWN_GROUP_2570");
        assert_eq!(signature_algorithm_name(1), "UNKNOWN_SIG_ALG_1");
    }

    #[test]
    fn test_cipher_reverse_lookup() {
        assert_eq!(cipher_suite_id("TLS_AES_256_GCM_SHA384"), Some(0x1302));
        assert_eq!(cipher_suite_id("ECDHE-RSA-AES128-GCM-SHA256"), Some(0xc02f));
        assert_eq!(
            cipher_suite_id("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"),
            Some(0xc02f)
        );
        assert_eq!(cipher_suite_id("NULL-MD5"), None);
    }
}
