//! # Typed Handlers
//!
//! Handlers are plain methods of a service type. Their parameter types say
//! what the dispatcher must supply, and their return type says how to reply:
//!
//! ```rust,ignore
//! impl Service {
//!     // POST /foo/<FooArg>/bar
//!     fn post_foo_bar(
//!         &self,
//!         args: Args<FooBarArgs>,
//!         env: Env<RestEnv>,
//!     ) -> Result<FooBarRet, HandlerError> {
//!         let id = format!("{}.{}.{}", env.cmd_args[0], args.a, args.b);
//!         Ok(FooBarRet { id })
//!     }
//! }
//! ```
//!
//! ## Parameter types
//!
//! | type            | shape                                            |
//! |-----------------|--------------------------------------------------|
//! | [`Context`]     | request-scoped cancellation context              |
//! | [`Env<E>`]      | environment `E`, opened before binding           |
//! | [`Args<T>`]     | structured argument, JSON or form                |
//! | [`Copied<T>`]   | structured argument by value (permissive mode)   |
//! | [`CmdArgs`]     | wildcard captures only                           |
//! | [`RawMap`]      | JSON body as an open map                         |
//! | [`RawBytes`]    | body bytes                                       |
//! | [`RawStream`]   | live body reader                                 |
//!
//! Any other combination is rejected when the handler is registered.
//!
//! [`Context`]: crate::dispatcher::Context
//! [`Env<E>`]: crate::environment::Env

mod core;


pub use core::{
    Args, BoxedHandler, CmdArgs, Copied, Handler, HandlerOutput, Outcome, Param, RawBytes,
    RawMap, RawStream,
};
pub(crate) use core::erase;
