//! Startup sequence and serve loop.
//!
//! Identity, trust store and TLS policy are all built before the socket is
//! bound, so a bad certificate or key never leaves a half-started listener
//! behind.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tonic::transport::Server;
use tracing::{info, warn};

use demogrpc_core::{Identity, TrustStore};
use demogrpc_proto::v1::demo_service_server::DemoServiceServer;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::listener::{AcceptLoop, bind};
use crate::policy::TlsPolicy;
use crate::service::DemoServiceImpl;

/// A fully initialised endpoint: policy built, socket bound, not yet
/// accepting.
pub struct SecureEndpoint {
    policy: TlsPolicy,
    listener: TcpListener,
    handshake_timeout: Duration,
}

impl SecureEndpoint {
    /// Load TLS material and bind the listener, in that order.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let identity = Identity::load(&config.cert_path, &config.key_path)?;
        info!(
            cert = %config.cert_path.display(),
            key = %config.key_path.display(),
            "Server identity loaded"
        );

        let trust = TrustStore::load(&config.ca_path)?;
        info!(
            ca = %config.ca_path.display(),
            anchors = trust.len(),
            "Trust store loaded"
        );

        let policy = TlsPolicy::new(identity, &trust)?;
        let listener = bind(&config.addr).await?;

        Ok(Self {
            policy,
            listener,
            handshake_timeout: config.handshake_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    /// Serve `DemoService` until `signal` resolves or the server fails.
    ///
    /// The listener is closed on the way out either way; a failure to close
    /// it is logged and does not change the result.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let (accept_loop, incoming) =
            AcceptLoop::spawn(self.listener, self.policy.acceptor(), self.handshake_timeout)?;
        info!(
            addr = %accept_loop.local_addr(),
            "Serving DemoService over mutual TLS 1.3"
        );

        let result = Server::builder()
            .add_service(DemoServiceServer::new(DemoServiceImpl::new()))
            .serve_with_incoming_shutdown(incoming, signal)
            .await;

        if let Err(e) = accept_loop.close().await {
            warn!(error = %e, "Failed to close listener");
        }

        result.map_err(ServerError::Serve)
    }
}

/// Start the endpoint described by `config` and serve until `shutdown`
/// resolves.
pub async fn run<F>(config: &ServerConfig, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    SecureEndpoint::bind(config)
        .await?
        .serve_with_shutdown(shutdown)
        .await
}
