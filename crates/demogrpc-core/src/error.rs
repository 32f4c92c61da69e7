//! Error types for TLS material loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`TlsError`].
pub type Result<T> = std::result::Result<T, TlsError>;

/// Failures while turning files on disk into a usable TLS policy.
///
/// Every variant is fatal at startup.
#[derive(Debug, Error)]
pub enum TlsError {
    /// Certificate or key missing, malformed, or not a matching pair.
    #[error(
        "Failed to load identity from {} and {}: {reason}",
        .cert_path.display(),
        .key_path.display()
    )]
    IdentityLoad {
        cert_path: PathBuf,
        key_path: PathBuf,
        reason: String,
    },

    /// The CA bundle could not be read.
    #[error("Failed to read trust store {}: {source}", .path.display())]
    TrustStoreLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CA bundle yielded no usable certificate.
    #[error("No valid CA certificate found in trust store {}", .path.display())]
    TrustStoreParse { path: PathBuf },

    /// rustls refused the assembled configuration.
    #[error("Failed to build TLS policy: {0}")]
    Policy(String),
}
