//! demogrpc Core Library
//!
//! Shared functionality for the demogrpc server and client:
//! - PEM loading of the TLS identity (certificate chain + private key)
//! - Trust store construction from a CA bundle
//! - The pinned TLS protocol version and crypto provider
//! - Tracing initialisation
//! - Development certificate generation (`certs` feature)

#[cfg(any(test, feature = "certs"))]
pub mod certs;
pub mod error;
pub mod identity;
pub mod tls;
pub mod tracing_init;
pub mod trust;

pub use error::{Result, TlsError};
pub use identity::Identity;
pub use tls::{ALPN_H2, PINNED_PROTOCOL_VERSIONS, crypto_provider};
pub use trust::TrustStore;
