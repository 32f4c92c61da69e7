//! Build script for demogrpc-proto
//!
//! Compiles the protobuf definitions with tonic-prost-build.

#[allow(clippy::print_stdout)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = "../../proto";
    let proto_path = format!("{proto_root}/demo/v1/demo.proto");

    println!("cargo:rerun-if-changed={proto_path}");

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&[proto_path.as_str()], &[proto_root])?;

    Ok(())
}
