//! # Dispatcher Module
//!
//! The dispatcher owns the request path from route match to reply. Each
//! request runs through the same sequence of stages:
//!
//! ```text
//! Matched -> EnvOpening -> Binding -> Invoking -> Replying -> Closed
//! ```
//!
//! - A failing environment open skips binding and the handler and replies
//!   with the open error. The environment is still closed.
//! - A binding failure replies 400 with the decoder's message.
//! - A handler error goes through the [`Replier`](crate::server::Replier).
//! - A typed result is marshalled and replied with 200. Without one the
//!   reply is 200 with `{}`.
//! - A reply committed through the [`ResponseSink`] replaces the default
//!   success reply.
//! - A handler panic is caught and replied with 500.
//!
//! Environments close when their guard drops, so close runs on every one of
//! these exits, unwinding included.
//!
//! ## Concurrency
//!
//! The dispatcher runs on the coroutine that accepted the request. Route
//! table, plans and service are shared read-only through `Arc`; an
//! [`Exchange`] belongs to one request only.

mod core;
mod exchange;

pub use core::{not_found, Dispatcher, PANIC_STATUS};
pub use exchange::{Context, Exchange, ResponseSink};
