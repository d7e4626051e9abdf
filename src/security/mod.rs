//! # Security Module
//!
//! Authentication is an environment concern. A handler that needs the
//! caller's identity declares an [`AuthEnv`]; its `open` hook reads the
//! `Authorization` header through a [`CredentialParser`] and refuses the
//! request before any argument is bound when the credential is bad.
//!
//! ```rust,ignore
//! impl Service {
//!     // POST /foo/<FooArg>/bar, authenticated
//!     fn post_foo_bar(
//!         &self,
//!         args: Args<FooBarArgs>,
//!         env: Env<AuthEnv>,
//!     ) -> Result<FooBarRet, HandlerError> {
//!         let id = format!("{}.{}.{}", env.user.uid, args.a, args.b);
//!         Ok(FooBarRet { id })
//!     }
//! }
//! ```
//!
//! ## Stub tokens
//!
//! [`StubTokenParser`] implements a test credential scheme that carries the
//! identity in clear text:
//!
//! ```text
//! Authorization: Stub uid=1&ut=4[&app=..][&suid=..[&sut=..]][&ak=..][&eu=..]
//! ```
//!
//! Any malformed credential is a `401 bad token`.

mod stub;

#[cfg(test)]
mod tests;

pub use stub::{
    bad_token, AuthEnv, CredentialParser, StubTokenParser, SudoerInfo, UserInfo, STUB_SCHEME,
};
