//! # Call Environments
//!
//! An environment is per-request auxiliary state a handler asks for as its
//! last parameter, wrapped in [`Env`]. Every environment follows the same
//! lifecycle:
//!
//! 1. a default value is created,
//! 2. [`Environment::open`] fills it from the service and the exchange, and
//!    may fail, in which case dispatch replies with that error and the handler
//!    never runs,
//! 3. [`Environment::close`] runs when the [`Env`] guard is dropped: after the
//!    handler returns, while unwinding from a handler panic, or right after a
//!    failed `open`.
//!
//! The [`EnvKind`] an environment reports is informational for the plan:
//! plain and legacy shapes are simply environments whose `open` only copies
//! request data.
//!
//! ```rust,ignore
//! fn get_foo_(&self, env: Env<RestEnv>) -> Result<FooInfo, HandlerError> {
//!     let id = &env.cmd_args[0];
//!     self.lookup(id).ok_or_else(|| HandlerError::status(404, "id not found"))
//! }
//! ```

mod core;

#[cfg(test)]
mod tests;

pub use core::{Env, Environment, RestEnv, RpcEnv};
