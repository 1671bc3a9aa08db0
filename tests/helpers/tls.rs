use boring::pkey::PKey;
use boring::ssl::{select_next_proto, AlpnError, SslAcceptor, SslMethod};
use boring::x509::X509;

/// Acceptor for a self-signed 127.0.0.1/localhost certificate that only
/// agrees to `alpn` (wire format), plus the certificate PEM to trust.
pub fn self_signed_acceptor(alpn: &'static [u8]) -> (SslAcceptor, Vec<u8>) {
    let names = vec!["127.0.0.1".to_string(), "localhost".to_string()];
    let cert = rcgen::generate_simple_self_signed(names).expect("generate certificate");
    let cert_pem = cert.cert.pem();
    let key_pem = cert.signing_key.serialize_pem();

    let key = PKey::private_key_from_pem(key_pem.as_bytes()).expect("parse key");
    let x509 = X509::from_pem(cert_pem.as_bytes()).expect("parse certificate");

    let mut builder = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).expect("acceptor");
    builder.set_private_key(&key).expect("set key");
    builder.set_certificate(&x509).expect("set certificate");
    builder.set_alpn_select_callback(move |_, offered| {
        select_next_proto(alpn, offered).ok_or(AlpnError::NOACK)
    });

    (builder.build(), cert_pem.into_bytes())
}
