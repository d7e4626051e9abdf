//! Error taxonomy for registration and dispatch.
//!
//! Only [`RegistrationError`] ever escapes to the caller, and only while the
//! route table is being built. Everything raised while serving a request is a
//! [`DispatchError`] and is turned into a reply by the dispatcher.

use serde::Serialize;
use thiserror::Error;

/// Status used for errors the error-to-status mapping does not recognise,
/// and for results that cannot be marshalled.
pub const GENERIC_FAILURE: u16 = 500;
/// Status for a missing entry.
pub const ENTRY_NOT_FOUND: u16 = 404;
/// Status for an entry that already exists.
pub const ENTRY_EXISTS: u16 = 409;

/// Structured error body: `{"error": .., "key"?: .., "errno"?: ..}`.
///
/// `code` is the HTTP status and never appears in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub errno: i32,
    #[serde(skip)]
    pub code: u16,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl ErrorInfo {
    #[must_use]
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: None,
            errno: 0,
            code,
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_errno(mut self, errno: i32) -> Self {
        self.errno = errno;
        self
    }
}

/// Business error returned by a handler or an environment's `open`.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid arguments")]
    InvalidArgument,
    #[error("entry not found")]
    NotFound,
    #[error("entry already exists")]
    AlreadyExists,
    /// Explicit status, errno and message chosen by the handler.
    #[error("{}", .0.message)]
    Status(ErrorInfo),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Status`] with just a code and a message.
    #[must_use]
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        HandlerError::Status(ErrorInfo::new(code, message))
    }

    /// Map the error onto the fixed status table.
    #[must_use]
    pub fn to_info(&self) -> ErrorInfo {
        match self {
            HandlerError::InvalidArgument => ErrorInfo::new(400, "invalid arguments"),
            HandlerError::NotFound => ErrorInfo::new(ENTRY_NOT_FOUND, "entry not found"),
            HandlerError::AlreadyExists => ErrorInfo::new(ENTRY_EXISTS, "entry already exists"),
            HandlerError::Status(info) => info.clone(),
            HandlerError::Other(err) => ErrorInfo::new(GENERIC_FAILURE, err.to_string()),
        }
    }
}

/// Raised while building a route table. Fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("invalid handler signature for `{method}`: {reason}")]
    InvalidSignature { method: String, reason: String },
    #[error("method `{0}` does not start with a known verb")]
    UnknownVerbPrefix(String),
    #[error("invalid route spec `{0}`")]
    InvalidRouteSpec(String),
}

/// Everything that can go wrong on the request path.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },
    #[error("environment open failed: {0}")]
    EnvironmentOpen(HandlerError),
    #[error("{0}")]
    Binding(String),
    #[error(transparent)]
    Handler(HandlerError),
    #[error("result marshal failed: {0}")]
    Marshal(#[from] serde_json::Error),
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl DispatchError {
    /// Log-friendly stage name.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            DispatchError::RouteNotFound { .. } => "match",
            DispatchError::EnvironmentOpen(_) => "env_open",
            DispatchError::Binding(_) => "binding",
            DispatchError::Handler(_) | DispatchError::Panicked(_) => "invoke",
            DispatchError::Marshal(_) => "reply",
        }
    }
}
