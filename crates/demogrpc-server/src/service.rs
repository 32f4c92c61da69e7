//! `DemoService` gRPC implementation.

use tonic::{Request, Response, Status};
use tracing::{debug, instrument};

use demogrpc_proto::v1::{HelloRequest, HelloResponse, demo_service_server::DemoService};

/// Build the `SayHello` reply text. Both fields are substituted verbatim.
pub fn greeting(name: &str, age: i32) -> String {
    format!("Hello {name}, you are {age} year(s) old.")
}

/// Stateless `DemoService` handler, shared by every connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoServiceImpl;

impl DemoServiceImpl {
    pub const fn new() -> Self {
        Self
    }
}

#[tonic::async_trait]
impl DemoService for DemoServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "SayHello"))]
    async fn say_hello(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<HelloResponse>, Status> {
        let client_certs = request.peer_certs().map_or(0, |certs| certs.len());
        debug!(client_certs, "Handling SayHello");

        let HelloRequest { name, age } = request.into_inner();
        Ok(Response::new(HelloResponse {
            response: greeting(&name, age),
        }))
    }
}
