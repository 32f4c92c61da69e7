//! demogrpc Client
//!
//! Calls `DemoService.SayHello` over mutual TLS and prints the greeting.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use demogrpc_client::{ClientConfig, greet};
use demogrpc_core::tls::files;
use demogrpc_core::tracing_init::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "demogrpc-client")]
#[command(version, about = "Call DemoService.SayHello over mutual TLS")]
struct Args {
    /// Endpoint URL.
    #[arg(long, default_value = "https://localhost:8443", env = "DEMOGRPC_URL")]
    url: String,

    /// Server name to verify the certificate against.
    #[arg(long, default_value = "localhost", env = "DEMOGRPC_DOMAIN")]
    domain: String,

    /// Path to the client certificate (PEM).
    #[arg(long, default_value = files::CLIENT_CERT, env = "DEMOGRPC_CLIENT_CERT")]
    cert: PathBuf,

    /// Path to the client private key (PEM).
    #[arg(long, default_value = files::CLIENT_KEY, env = "DEMOGRPC_CLIENT_KEY")]
    key: PathBuf,

    /// Path to the CA bundle that signed the server certificate (PEM).
    #[arg(long, default_value = files::CA_CERT, env = "DEMOGRPC_CA")]
    ca: PathBuf,

    /// Name to greet.
    #[arg(long)]
    name: String,

    /// Age to report.
    #[arg(long, allow_negative_numbers = true)]
    age: i32,

    /// Output logs as JSON.
    #[arg(long, env = "DEMOGRPC_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
#[allow(clippy::print_stdout)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("demogrpc_client=warn", args.log_json);

    let config = ClientConfig {
        url: args.url,
        domain: args.domain,
        cert_path: Some(args.cert),
        key_path: Some(args.key),
        ca_path: args.ca,
    };

    let message = greet(&config, &args.name, args.age)
        .await
        .with_context(|| format!("SayHello to {} failed", config.url))?;
    println!("{message}");
    Ok(())
}
