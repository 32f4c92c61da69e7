//! demogrpc Client Library
//!
//! Connects to a `DemoService` endpoint over mutual TLS and calls
//! `SayHello`.

use std::path::{Path, PathBuf};

use tonic::transport::{Certificate, Channel, ClientTlsConfig, Identity};
use tracing::debug;

use demogrpc_core::TrustStore;
use demogrpc_proto::v1::HelloRequest;
use demogrpc_proto::v1::demo_service_client::DemoServiceClient;

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Endpoint URL, e.g. `https://localhost:8443`.
    pub url: String,
    /// Name checked against the server certificate.
    pub domain: String,
    /// Client certificate (PEM). Both this and `key_path` must be set to
    /// present an identity.
    pub cert_path: Option<PathBuf>,
    /// Client private key (PEM).
    pub key_path: Option<PathBuf>,
    /// CA bundle that signed the server certificate (PEM).
    pub ca_path: PathBuf,
}

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to read {}: {source}", .path.display())]
    ReadPem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid client identity: {0}")]
    InvalidIdentity(String),

    #[error("No valid CA certificate in {}", .0.display())]
    InvalidCa(PathBuf),

    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("RPC failed: {0}")]
    Rpc(#[from] tonic::Status),
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ClientError> {
    std::fs::read(path).map_err(|source| ClientError::ReadPem {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the TLS settings for `config`, validating the PEM material first
/// so that a bad key surfaces here rather than as a handshake failure.
pub fn tls_config(config: &ClientConfig) -> Result<ClientTlsConfig, ClientError> {
    let ca_pem = read_pem(&config.ca_path)?;
    if TrustStore::from_pem(&ca_pem).is_none() {
        return Err(ClientError::InvalidCa(config.ca_path.clone()));
    }

    let mut tls = ClientTlsConfig::new()
        .domain_name(config.domain.clone())
        .ca_certificate(Certificate::from_pem(ca_pem));

    if let (Some(cert_path), Some(key_path)) = (&config.cert_path, &config.key_path) {
        let cert_pem = read_pem(cert_path)?;
        let key_pem = read_pem(key_path)?;
        demogrpc_core::Identity::from_pem(&cert_pem, &key_pem)
            .map_err(ClientError::InvalidIdentity)?;
        tls = tls.identity(Identity::from_pem(cert_pem, key_pem));
    } else {
        debug!("No client identity configured; the server will refuse the handshake");
    }

    Ok(tls)
}

/// Open a channel to the endpoint.
pub async fn connect(config: &ClientConfig) -> Result<DemoServiceClient<Channel>, ClientError> {
    let tls = tls_config(config)?;
    let channel = Channel::from_shared(config.url.clone())
        .map_err(|e| ClientError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?
        .tls_config(tls)?
        .connect()
        .await?;

    debug!(url = %config.url, "Connected");
    Ok(DemoServiceClient::new(channel))
}

/// Call `SayHello` and return the greeting.
pub async fn say_hello(
    client: &mut DemoServiceClient<Channel>,
    name: &str,
    age: i32,
) -> Result<String, ClientError> {
    let response = client
        .say_hello(HelloRequest {
            name: name.to_string(),
            age,
        })
        .await?;
    Ok(response.into_inner().response)
}

/// Connect and call `SayHello` once.
pub async fn greet(config: &ClientConfig, name: &str, age: i32) -> Result<String, ClientError> {
    let mut client = connect(config).await?;
    say_hello(&mut client, name, age).await
}
