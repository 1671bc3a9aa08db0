//! PeetPrint fingerprint.

use sha2::{Digest, Sha256};

/// PeetPrint: `<negotiated>-<record>|groups|sigalgs|extensions|ciphers`.
///
/// All values decimal; an empty list leaves its segment empty.
pub fn peet_print(
    negotiated_version: u16,
    record_version: u16,
    cipher_suites: &[u16],
    extensions: &[u16],
    supported_groups: &[u16],
    signature_algorithms: &[u16],
) -> String {
    [
        format!("{}-{}", negotiated_version, record_version),
        decimal_list(supported_groups),
        decimal_list(signature_algorithms),
        decimal_list(extensions),
        decimal_list(cipher_suites),
    ]
    .join("|")
}

/// Lower-case hex SHA-256 of a PeetPrint string.
pub fn peet_print_hash(peet_print: &str) -> String {
    hex::encode(Sha256::digest(peet_print.as_bytes()))
}

fn decimal_list(values: &[u16]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
