//! demogrpc Protocol Buffers
//!
//! Generated code for the `demo.v1` package: the `DemoService` server and
//! client stubs plus the `HelloRequest` / `HelloResponse` messages.

#![allow(clippy::derive_partial_eq_without_eq)]

/// `demo.v1` API definitions.
pub mod v1 {
    tonic::include_proto!("demo.v1");
}

pub use v1::*;
