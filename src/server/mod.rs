//! HTTP boundary: request and response types, the `may_minihttp` service and
//! the server wrapper.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, Body, Request, RequestHead};
pub use response::{
    error_response, status_reason, write_response, JsonReplier, Replier, Response,
    APPLICATION_JSON,
};
pub use service::AppService;
