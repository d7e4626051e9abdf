//! # brrtrpc
//!
//! **brrtrpc** is a convention-driven REST/RPC dispatch engine on the `may`
//! coroutine runtime. Handlers are plain methods of a service type: their
//! names become routes and their signatures become calling plans.
//!
//! ## Overview
//!
//! ```rust,ignore
//! use brrtrpc::prelude::*;
//!
//! #[derive(Deserialize)]
//! struct FooBarArgs { a: String, b: String }
//!
//! #[derive(Serialize)]
//! struct FooBarRet { id: String }
//!
//! struct Service;
//!
//! impl Service {
//!     /// POST /foo/<FooArg>/bar  JSON {a, b}  ->  {id}
//!     fn post_foo_bar(
//!         &self,
//!         args: Args<FooBarArgs>,
//!         env: Env<RestEnv>,
//!     ) -> Result<FooBarRet, HandlerError> {
//!         Ok(FooBarRet { id: format!("{}.{}.{}", env.cmd_args[0], args.a, args.b) })
//!     }
//! }
//!
//! let table = RouterBuilder::new()
//!     .method("PostFoo_Bar", Service::post_foo_bar)?
//!     .build();
//! let service = AppService::new(Dispatcher::new(Service, table));
//! HttpServer(service).start("0.0.0.0:9898")?.join();
//! ```
//!
//! Every handler is classified once, when it is registered. A signature the
//! engine cannot serve is a [`RegistrationError`](error::RegistrationError)
//! at startup, never a failure on the request path.
//!
//! ## Architecture
//!
//! - **[`router`]** - route derivation from method names, route specs, first-match lookup
//! - **[`signature`]** - classification of handler signatures into a [`HandlerPlan`](signature::HandlerPlan)
//! - **[`typed`]** - parameter and result types handlers are written with
//! - **[`binder`]** - request decoding (JSON, form, raw map, bytes, stream)
//! - **[`environment`]** - per-call environments with open/close lifecycle
//! - **[`dispatcher`]** - the request state machine and error translation
//! - **[`server`]** - `may_minihttp` integration, request/response types, [`Replier`](server::Replier)
//! - **[`security`]** - credential parsing and the authenticated environment
//! - **[`config`]**, **[`logging`]**, **[`ids`]** - configuration, tracing setup, request ids
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as HttpServer<br/>(may_minihttp)
//!     participant Table as RouteTable
//!     participant Dispatcher as Dispatcher
//!     participant Env as Environment
//!     participant Binder as RequestBinder
//!     participant Handler as Handler
//!
//!     Client->>Server: POST /foo/cmd1/bar
//!     Server->>Dispatcher: dispatch(request)
//!     Dispatcher->>Table: find("POST", "/foo/cmd1/bar")
//!     alt No Route Match
//!         Dispatcher-->>Client: 404 {"error": "Not Found", ...}
//!     end
//!     Table-->>Dispatcher: route + captures ["cmd1"]
//!     Dispatcher->>Env: open
//!     alt Open Failed
//!         Env-->>Client: error reply (e.g. 401 bad token)
//!     end
//!     Dispatcher->>Binder: bind body + captures
//!     alt Binding Failed
//!         Binder-->>Client: 400 {"error": ...}
//!     end
//!     Dispatcher->>Handler: invoke
//!     Handler-->>Dispatcher: Result<T, HandlerError>
//!     Dispatcher->>Env: close (on drop)
//!     Dispatcher-->>Client: 200 JSON / error reply
//! ```

pub mod binder;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod environment;
pub mod error;
pub mod ids;
pub mod logging;
pub mod router;
pub mod security;
pub mod server;
pub mod signature;
pub mod typed;

pub use config::{Config, RouterConfig, ServerConfig};
pub use dispatcher::{Context, Dispatcher, Exchange};
pub use error::{DispatchError, ErrorInfo, HandlerError, RegistrationError};
pub use router::{RouteTable, RouterBuilder};
pub use server::{AppService, HttpServer, Request, Response};

/// Everything a service module usually imports.
pub mod prelude {
    pub use crate::dispatcher::{Context, Dispatcher, Exchange, ResponseSink};
    pub use crate::environment::{Env, Environment, RestEnv, RpcEnv};
    pub use crate::error::{ErrorInfo, HandlerError};
    pub use crate::router::RouterBuilder;
    pub use crate::security::AuthEnv;
    pub use crate::server::{AppService, HttpServer};
    pub use crate::typed::{Args, CmdArgs, Copied, RawBytes, RawMap, RawStream};
    pub use serde::{Deserialize, Serialize};
}
