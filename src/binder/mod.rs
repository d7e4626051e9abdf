//! # Request Binding
//!
//! A [`RequestBinder`] turns the raw request into input for the handler's
//! argument type. The strategy is fixed per handler, when the handler is
//! classified, from the argument's [`ArgDescriptor`]:
//!
//! | descriptor        | strategy                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | `Structured`      | JSON body, or form body (+ query for GET/HEAD/DELETE)      |
//! | `RawMap`          | JSON body into an open map; non-JSON is `invalid argument` |
//! | `RawBytes`        | body bytes, undecoded                                      |
//! | `RawStream`       | the live body reader                                       |
//! | `CommandArgsOnly` | nothing, the body is never read                            |
//!
//! Wildcard captures are copied into [`BindInput::cmd_args`] before the body
//! is touched, whatever the strategy.
//!
//! [`form`] is the serde glue for urlencoded records, usable on its own.
//!
//! [`ArgDescriptor`]: crate::signature::ArgDescriptor

mod core;
pub mod form;

#[cfg(test)]
mod tests;

pub use core::{BindInput, BoundBody, RequestBinder};
pub(crate) use core::unexpected;
