//! Protocol constants shared by every TLS endpoint in the workspace.

use std::sync::Arc;

use rustls::SupportedProtocolVersion;
use rustls::crypto::CryptoProvider;

/// The only protocol version either side will speak.
///
/// Min and max are the same on purpose: there is no negotiation range.
pub static PINNED_PROTOCOL_VERSIONS: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// ALPN identifier for HTTP/2, required by gRPC.
pub const ALPN_H2: &[u8] = b"h2";

/// Default file names, relative to the working directory.
pub mod files {
    pub const CA_CERT: &str = "cacert.pem";
    pub const SERVER_CERT: &str = "server.pem";
    pub const SERVER_KEY: &str = "server.key";
    pub const CLIENT_CERT: &str = "client.pem";
    pub const CLIENT_KEY: &str = "client.key";
}

/// The ring-backed crypto provider used for every config we build.
///
/// Always passed explicitly; no process-wide default provider is installed.
pub fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_tls13_is_pinned() {
        assert_eq!(PINNED_PROTOCOL_VERSIONS.len(), 1);
        assert_eq!(
            PINNED_PROTOCOL_VERSIONS[0].version,
            rustls::ProtocolVersion::TLSv1_3
        );
    }

    #[test]
    fn provider_supports_tls13_suites() {
        let provider = crypto_provider();
        assert!(
            provider
                .cipher_suites
                .iter()
                .any(|suite| suite.version().version == rustls::ProtocolVersion::TLSv1_3)
        );
    }
}
