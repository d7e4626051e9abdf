//! # Router Module
//!
//! Routes are either derived from handler method names or given as explicit
//! route specs. Both compile to a [`RoutePattern`]: a verb plus a fixed list
//! of literal and wildcard tokens.
//!
//! ## Derived routes
//!
//! The method name's verb prefix becomes the HTTP verb. The rest is split on
//! uppercase boundaries, and each separator (default `_`) becomes a wildcard:
//!
//! | method          | route                    |
//! |-----------------|--------------------------|
//! | `GetStatus`     | `GET /status`            |
//! | `PostFoo_Bar`   | `POST /foo/*/bar`        |
//! | `PutFoo_Bar_`   | `PUT /foo/*/bar/*`       |
//! | `DeleteHosts_`  | `DELETE /hosts/*`        |
//!
//! Literals compare case-insensitively, so `/Foo` and `/foo` are the same.
//!
//! ## Matching
//!
//! A request matches a pattern only when it has exactly as many segments as
//! the pattern has tokens. Routes are tried in registration order and the
//! first match wins. When nothing matches, the table's default handler runs if
//! there is one; otherwise the dispatcher replies with a structured 404.
//!
//! ## Example
//!
//! ```rust,ignore
//! use brrtrpc::router::RouterBuilder;
//!
//! let table = RouterBuilder::new()
//!     .prefix("/v1")
//!     .method("PostFoo_Bar", Service::post_foo_bar)?
//!     .route("POST /servers/*/action", "ServerAction", Service::server_action)?
//!     .build();
//!
//! let m = table.find("POST", "/v1/foo/cmd1/bar").unwrap();
//! assert_eq!(m.captures.as_slice(), ["cmd1"]);
//! ```

mod core;
pub mod derive;
pub mod pattern;


pub use core::{DefaultHandler, Route, RouteMatch, RouteTable, RouterBuilder};
pub use derive::{derive_pattern, verb_prefix};
pub use pattern::{split_path, Captures, RoutePattern, Token};
