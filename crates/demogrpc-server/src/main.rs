//! demogrpc Server
//!
//! Serves `DemoService` over mutually authenticated TLS 1.3.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use demogrpc_core::certs::{generate_dev_bundle, write_dev_bundle};
use demogrpc_core::tls::files;
use demogrpc_core::tracing_init::init_tracing;
use demogrpc_server::ServerConfig;
use demogrpc_server::config::DEFAULT_ADDR;

#[derive(Parser, Debug)]
#[command(name = "demogrpc-server")]
#[command(version, about = "DemoService gRPC server over mutual TLS 1.3")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, global = true, env = "DEMOGRPC_LOG_JSON")]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a development CA plus server and client certificates.
    GenCerts {
        /// Directory to write the PEM files into.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// DNS names or IP addresses the server certificate is valid for.
        #[arg(long = "name", default_values = ["localhost", "127.0.0.1"])]
        names: Vec<String>,

        /// Common name of the client certificate.
        #[arg(long, default_value = "demogrpc-client")]
        client_name: String,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_ADDR, env = "DEMOGRPC_ADDR")]
    addr: String,

    /// Path to the server certificate (PEM).
    #[arg(long, default_value = files::SERVER_CERT, env = "DEMOGRPC_CERT")]
    cert: PathBuf,

    /// Path to the server private key (PEM).
    #[arg(long, default_value = files::SERVER_KEY, env = "DEMOGRPC_KEY")]
    key: PathBuf,

    /// Path to the CA bundle used to verify client certificates (PEM).
    #[arg(long, default_value = files::CA_CERT, env = "DEMOGRPC_CA")]
    ca: PathBuf,

    /// Seconds a client may take to complete the TLS handshake.
    #[arg(
        long,
        default_value_t = 10,
        env = "DEMOGRPC_HANDSHAKE_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    handshake_timeout: u64,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            cert_path: self.cert,
            key_path: self.key,
            ca_path: self.ca,
            handshake_timeout: std::time::Duration::from_secs(self.handshake_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing("demogrpc_server=info,demogrpc_core=info", cli.log_json);

    if let Some(Command::GenCerts {
        out_dir,
        names,
        client_name,
    }) = cli.command
    {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let bundle = generate_dev_bundle(&names, &client_name)
            .context("Failed to generate dev certificates")?;
        write_dev_bundle(&out_dir, &bundle).context("Failed to write dev certificates")?;
        return Ok(());
    }

    let config = cli.serve.into_config();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.addr,
        "Starting demogrpc-server"
    );

    demogrpc_server::run(&config, shutdown_signal())
        .await
        .context("demogrpc-server failed")?;

    info!("demogrpc-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn no_flags_reproduce_fixed_defaults() {
        let cli = Cli::try_parse_from(["demogrpc-server"]).unwrap();
        assert!(cli.command.is_none());

        let config = cli.serve.into_config();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr, "localhost:8443");
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
    }

    #[test]
    fn zero_handshake_timeout_is_rejected() {
        let err = Cli::try_parse_from(["demogrpc-server", "--handshake-timeout", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn handshake_timeout_flag_is_seconds() {
        let cli = Cli::try_parse_from(["demogrpc-server", "--handshake-timeout", "3"]).unwrap();
        assert_eq!(
            cli.serve.into_config().handshake_timeout,
            Duration::from_secs(3)
        );
    }

    #[test]
    fn gen_certs_defaults_cover_localhost() {
        let cli = Cli::try_parse_from(["demogrpc-server", "gen-certs"]).unwrap();
        let Some(Command::GenCerts { names, .. }) = cli.command else {
            panic!("expected gen-certs");
        };
        assert_eq!(names, ["localhost", "127.0.0.1"]);
    }
}
