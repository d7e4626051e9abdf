use crate::binder::RequestBinder;
use crate::error::RegistrationError;
use tracing::{debug, warn};

/// Kind of per-call environment a handler declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    None,
    /// Response sink and request head, nothing else.
    Plain,
    /// Environment with an `open` hook that may fail and a guaranteed `close`.
    Lifecycled,
    /// Old two-field environment received by value.
    LegacyValue,
    /// Old two-field environment received by reference.
    LegacyReference,
}

impl EnvKind {
    #[must_use]
    pub fn is_legacy(self) -> bool {
        matches!(self, EnvKind::LegacyValue | EnvKind::LegacyReference)
    }
}

/// How a request argument is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgDescriptor {
    /// JSON or form decoding into a typed record.
    Structured,
    /// JSON body decoded into an open map.
    RawMap,
    /// Body bytes copied as they are.
    RawBytes,
    /// The live body reader.
    RawStream,
    /// Only the wildcard captures, the body is never read.
    CommandArgsOnly,
}

/// How the handler receives its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    ByReference,
    /// Accepted only in permissive mode.
    ByValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub descriptor: ArgDescriptor,
    pub receipt: Receipt,
}

/// Shape of one declared handler parameter, receiver excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    /// Request-scoped cancellation context.
    Context,
    Environment(EnvKind),
    Argument(ArgSpec),
}

/// Shape of one declared handler result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Value,
    Error,
}

/// Declared parameters and results of a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<ParamShape>,
    pub results: Vec<ResultShape>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    /// Accept arguments received by value.
    pub permissive: bool,
}

/// Pre-validated calling convention of one handler.
///
/// Built once at registration and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerPlan {
    pub has_context: bool,
    pub arg: Option<ArgSpec>,
    pub env_kind: EnvKind,
    pub has_typed_result: bool,
    binder: Option<RequestBinder>,
}

impl HandlerPlan {
    /// Binder selected for the argument, if the handler takes one.
    #[must_use]
    pub fn binder(&self) -> Option<&RequestBinder> {
        self.binder.as_ref()
    }

    #[must_use]
    pub fn has_arg(&self) -> bool {
        self.arg.is_some()
    }
}

fn reject(method: &str, reason: impl Into<String>) -> RegistrationError {
    let reason = reason.into();
    warn!(method = %method, reason = %reason, "Handler signature rejected");
    RegistrationError::InvalidSignature {
        method: method.to_string(),
        reason,
    }
}

/// Decide the calling convention of `method` from its declared shapes.
pub fn classify(
    method: &str,
    sig: &Signature,
    opts: &ClassifyOptions,
) -> Result<HandlerPlan, RegistrationError> {
    let mut params: &[ParamShape] = &sig.params;

    // S1: context, trailing or leading
    let mut has_context = false;
    if let [rest @ .., ParamShape::Context] = params {
        has_context = true;
        params = rest;
    } else if let [ParamShape::Context, rest @ ..] = params {
        has_context = true;
        params = rest;
    }

    // S2: environment in the final position
    let mut env_kind = EnvKind::None;
    if let [rest @ .., ParamShape::Environment(kind)] = params {
        env_kind = *kind;
        params = rest;
    }

    // S3: at most one argument remains
    let arg = match params {
        [] => None,
        [ParamShape::Argument(spec)] => Some(*spec),
        [ParamShape::Context] => {
            return Err(reject(method, "context must be the first or last parameter"))
        }
        [ParamShape::Environment(_)] => {
            return Err(reject(method, "environment must follow the request argument"))
        }
        more => {
            return Err(reject(
                method,
                format!("expected at most one request argument, found {}", more.len()),
            ))
        }
    };
    if let Some(spec) = arg {
        if spec.receipt == Receipt::ByValue && !opts.permissive {
            return Err(reject(
                method,
                "request argument must be received by reference",
            ));
        }
    }

    // S4: results are (error) or (value, error)
    let has_typed_result = match sig.results.as_slice() {
        [ResultShape::Error] => false,
        [ResultShape::Value, ResultShape::Error] => true,
        [] => return Err(reject(method, "handler must return an error-capable result")),
        [.., ResultShape::Value] => {
            return Err(reject(method, "final result is not an error"))
        }
        other => {
            return Err(reject(
                method,
                format!("expected (error) or (value, error), found {} results", other.len()),
            ))
        }
    };

    if env_kind.is_legacy() {
        warn!(method = %method, env_kind = ?env_kind, "Legacy environment shape in use");
    }

    let plan = HandlerPlan {
        has_context,
        arg,
        env_kind,
        has_typed_result,
        binder: arg.map(|spec| RequestBinder::for_descriptor(spec.descriptor)),
    };
    debug!(
        method = %method,
        has_context = plan.has_context,
        arg = ?plan.arg.map(|a| a.descriptor),
        env_kind = ?plan.env_kind,
        has_typed_result = plan.has_typed_result,
        "Handler classified"
    );
    Ok(plan)
}
