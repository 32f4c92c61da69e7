//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use demogrpc_core::tls::files;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "localhost:8443";

/// Default upper bound on a single TLS handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the endpoint needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` to bind. Host names are resolved at bind time.
    pub addr: String,
    /// PEM server certificate chain.
    pub cert_path: PathBuf,
    /// PEM server private key.
    pub key_path: PathBuf,
    /// PEM bundle of CAs trusted to sign client certificates.
    pub ca_path: PathBuf,
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            cert_path: PathBuf::from(files::SERVER_CERT),
            key_path: PathBuf::from(files::SERVER_KEY),
            ca_path: PathBuf::from(files::CA_CERT),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}
