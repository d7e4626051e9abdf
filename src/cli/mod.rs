//! # CLI Module
//!
//! The `brrtrpc` binary answers two questions about a route table without
//! starting a server.
//!
//! ### `derive`
//!
//! Which route does a handler method name produce?
//!
//! ```bash
//! $ brrtrpc derive PostFoo_Bar GetHosts_ --prefix /v1
//! POST /v1/Foo/*/Bar -> PostFoo_Bar
//! GET /v1/Hosts/* -> GetHosts_
//! ```
//!
//! ### `match`
//!
//! Which route wins for a request, and what does it capture? Explicit
//! `--route` specs register before `--method` names, and the first match
//! wins.
//!
//! ```bash
//! $ brrtrpc match --route "GET /bar/*" --route "GET /bar/xyz" GET /bar/xyz
//! GET /bar/* -> GET /bar/* captures=["xyz"]
//! ```
//!
//! `--sep` and `--prefix` default to `BRRTRPC_SEPARATOR` and
//! `BRRTRPC_PATTERN_PREFIX` when those are set.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{build_table, run, run_cli, Cli, Commands, RouteOptions};
