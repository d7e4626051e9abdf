use super::form;
use crate::dispatcher::Exchange;
use crate::error::DispatchError;
use crate::server::Body;
use crate::signature::ArgDescriptor;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Decoding strategy for one handler's argument.
///
/// Chosen once from the argument descriptor when the handler is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestBinder {
    Structured,
    RawMap,
    RawBytes,
    RawStream,
    CommandArgsOnly,
}

/// Body after the strategy ran, not yet typed.
#[derive(Debug)]
pub enum BoundBody {
    /// Body skipped.
    None,
    /// JSON text; an empty body reads as `{}`.
    Json(Vec<u8>),
    /// Form pairs, plus query pairs for parameter-less verbs.
    Form(Vec<(String, String)>),
    RawMap(Map<String, Value>),
    Bytes(Vec<u8>),
    Stream(Body),
}

/// Captures and body handed to an argument type.
#[derive(Debug)]
pub struct BindInput {
    pub cmd_args: Vec<String>,
    pub body: BoundBody,
}

impl BindInput {
    /// Decode a structured body into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<(Vec<String>, T), DispatchError> {
        let value = match self.body {
            BoundBody::Json(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| DispatchError::Binding(e.to_string()))?
            }
            BoundBody::Form(pairs) => {
                form::from_pairs(&pairs).map_err(|e| DispatchError::Binding(e.to_string()))?
            }
            other => return Err(unexpected("structured", &other)),
        };
        Ok((self.cmd_args, value))
    }
}

pub(crate) fn unexpected(wanted: &str, got: &BoundBody) -> DispatchError {
    DispatchError::Binding(format!("expected {wanted} body, binder produced {got:?}"))
}

fn read_body(ex: &mut Exchange) -> Result<Vec<u8>, DispatchError> {
    match ex.take_body() {
        Some(body) => body
            .into_bytes()
            .map_err(|e| DispatchError::Binding(e.to_string())),
        None => Ok(Vec::new()),
    }
}

/// Verbs whose query string carries the form parameters.
fn reads_query(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::DELETE | Method::OPTIONS
    )
}

impl RequestBinder {
    #[must_use]
    pub fn for_descriptor(descriptor: ArgDescriptor) -> Self {
        match descriptor {
            ArgDescriptor::Structured => RequestBinder::Structured,
            ArgDescriptor::RawMap => RequestBinder::RawMap,
            ArgDescriptor::RawBytes => RequestBinder::RawBytes,
            ArgDescriptor::RawStream => RequestBinder::RawStream,
            ArgDescriptor::CommandArgsOnly => RequestBinder::CommandArgsOnly,
        }
    }

    /// Run the strategy against the request.
    ///
    /// Captures are copied first; the body is left untouched for
    /// [`RequestBinder::CommandArgsOnly`].
    pub fn bind(&self, ex: &mut Exchange) -> Result<BindInput, DispatchError> {
        let cmd_args = ex.captures().to_vec();
        let body = match self {
            RequestBinder::CommandArgsOnly => BoundBody::None,
            RequestBinder::Structured => {
                if ex.head().is_json() {
                    let bytes = read_body(ex)?;
                    BoundBody::Json(if bytes.is_empty() { b"{}".to_vec() } else { bytes })
                } else {
                    let bytes = read_body(ex)?;
                    let mut pairs: Vec<(String, String)> = if reads_query(&ex.head().method) {
                        ex.head().query_pairs()
                    } else {
                        Vec::new()
                    };
                    pairs.extend(url::form_urlencoded::parse(&bytes).into_owned());
                    BoundBody::Form(pairs)
                }
            }
            RequestBinder::RawMap => {
                if !ex.head().is_json() {
                    return Err(DispatchError::Binding("invalid argument".to_string()));
                }
                let bytes = read_body(ex)?;
                if bytes.is_empty() {
                    BoundBody::RawMap(Map::new())
                } else {
                    BoundBody::RawMap(
                        serde_json::from_slice(&bytes)
                            .map_err(|e| DispatchError::Binding(e.to_string()))?,
                    )
                }
            }
            RequestBinder::RawBytes => BoundBody::Bytes(read_body(ex)?),
            RequestBinder::RawStream => {
                BoundBody::Stream(ex.take_body().unwrap_or_else(Body::empty))
            }
        };
        debug!(
            request_id = %ex.request_id(),
            binder = ?self,
            cmd_args = cmd_args.len(),
            "Request bound"
        );
        Ok(BindInput { cmd_args, body })
    }
}
