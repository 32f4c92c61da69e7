//! demogrpc Server Library
//!
//! A `DemoService` gRPC endpoint reachable only over mutually
//! authenticated TLS 1.3:
//! - TLS policy built from the server identity and the client trust store
//! - Accept loop that hands tonic already-authenticated TLS streams
//! - The `SayHello` handler

pub mod config;
pub mod endpoint;
pub mod error;
pub mod listener;
pub mod policy;
pub mod service;

pub use config::ServerConfig;
pub use endpoint::{SecureEndpoint, run};
pub use error::{HandshakeError, ServerError};
pub use policy::TlsPolicy;
pub use service::{DemoServiceImpl, greeting};
