//! Server error types.

use std::time::Duration;

use demogrpc_core::TlsError;

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Identity, trust store, or policy could not be built.
    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("Failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read listener address: {0}")]
    LocalAddr(#[source] std::io::Error),

    #[error("gRPC server failed: {0}")]
    Serve(#[from] tonic::transport::Error),

    /// Only ever logged; the process is already shutting down.
    #[error("Failed to close listener: {0}")]
    ListenerClose(String),
}

/// Why a single connection was dropped before reaching the service.
///
/// Never escalated: the listener and other connections are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("TLS handshake did not complete within {0:?}")]
    Timeout(Duration),

    /// Wrong protocol version, missing or untrusted client certificate, or
    /// plain garbage on the wire.
    #[error("TLS handshake rejected: {0}")]
    Rejected(#[source] std::io::Error),
}
