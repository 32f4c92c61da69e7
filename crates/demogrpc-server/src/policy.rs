//! TLS policy for the endpoint.

use std::sync::Arc;

use rustls::ServerConfig as RustlsServerConfig;
use rustls::server::WebPkiClientVerifier;
use tokio_rustls::TlsAcceptor;
use tracing::info;

use demogrpc_core::{
    ALPN_H2, Identity, PINNED_PROTOCOL_VERSIONS, TlsError, TrustStore, crypto_provider,
};

/// Immutable server-side TLS settings shared by every handshake.
///
/// TLS 1.3 only, client certificate mandatory and verified against the
/// trust store, ALPN `h2`.
#[derive(Debug, Clone)]
pub struct TlsPolicy {
    config: Arc<RustlsServerConfig>,
}

impl TlsPolicy {
    pub fn new(identity: Identity, trust: &TrustStore) -> Result<Self, TlsError> {
        let provider = crypto_provider();

        let verifier =
            WebPkiClientVerifier::builder_with_provider(trust.roots(), Arc::clone(&provider))
                .build()
                .map_err(|e| TlsError::Policy(format!("client certificate verifier: {e}")))?;

        let (cert_chain, key) = identity.into_parts();
        let mut config = RustlsServerConfig::builder_with_provider(provider)
            .with_protocol_versions(PINNED_PROTOCOL_VERSIONS)
            .map_err(|e| TlsError::Policy(e.to_string()))?
            .with_client_cert_verifier(verifier)
            .with_single_cert(cert_chain, key)
            .map_err(|e| TlsError::Policy(e.to_string()))?;
        config.alpn_protocols = vec![ALPN_H2.to_vec()];

        info!(
            anchors = trust.len(),
            "TLS policy ready (TLS 1.3 only, client certificate required)"
        );
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// A handshake driver over this policy.
    pub fn acceptor(&self) -> TlsAcceptor {
        TlsAcceptor::from(Arc::clone(&self.config))
    }

    pub fn rustls_config(&self) -> &Arc<RustlsServerConfig> {
        &self.config
    }
}
