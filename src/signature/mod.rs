//! # Signature Classification
//!
//! Every handler is inspected exactly once, when it is registered. Its
//! parameter and result shapes are reduced to a [`HandlerPlan`], and a handler
//! whose shape does not fit one of the supported calling conventions is
//! rejected with [`RegistrationError::InvalidSignature`].
//!
//! ## Supported shapes
//!
//! ```text
//! fn(&S [, Context] [, ARG] [, Env<E>] [, Context]) -> Result<(), HandlerError>
//! fn(&S [, Context] [, ARG] [, Env<E>] [, Context]) -> Result<T, HandlerError>
//! ```
//!
//! At most one `Context` is accepted, first or last. `ARG` is one of the
//! argument wrappers from [`crate::typed`]; its [`ArgDescriptor`] picks the
//! request binder once, here, instead of on every request.
//!
//! Shapes are reported by the parameter and output types themselves through
//! [`crate::typed::Param::shape`] and [`crate::typed::HandlerOutput::results`],
//! so classification is capability probing over a fixed set of traits rather
//! than open-ended inspection.
//!
//! [`RegistrationError::InvalidSignature`]: crate::error::RegistrationError::InvalidSignature

mod core;

#[cfg(test)]
mod tests;

pub use core::{
    classify, ArgDescriptor, ArgSpec, ClassifyOptions, EnvKind, HandlerPlan, ParamShape, Receipt,
    ResultShape, Signature,
};
