use crate::binder::{unexpected, BindInput, BoundBody};
use crate::dispatcher::{Context, Exchange};
use crate::environment::{Env, Environment};
use crate::error::{DispatchError, HandlerError};
use crate::server::Body;
use crate::signature::{ArgDescriptor, ArgSpec, HandlerPlan, ParamShape, Receipt, ResultShape, Signature};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::TypeId;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// A value a handler can declare as a parameter.
///
/// Construction is split in two phases so every environment of a handler is
/// opened before any argument is bound.
pub trait Param<S>: Sized + Send + 'static {
    /// Intermediate state between the two phases.
    type Slot;

    fn shape() -> ParamShape;

    /// Environment opening phase.
    fn open(svc: &S, ex: &Exchange) -> Result<Self::Slot, DispatchError>;

    /// Binding phase.
    fn bind(slot: Self::Slot, ex: &mut Exchange, plan: &HandlerPlan) -> Result<Self, DispatchError>;
}

fn argument(descriptor: ArgDescriptor, receipt: Receipt) -> ParamShape {
    ParamShape::Argument(ArgSpec {
        descriptor,
        receipt,
    })
}

fn bind_input(ex: &mut Exchange, plan: &HandlerPlan) -> Result<BindInput, DispatchError> {
    plan.binder()
        .ok_or_else(|| DispatchError::Binding("handler plan has no binder".to_string()))?
        .bind(ex)
}

impl<S> Param<S> for Context {
    type Slot = Context;

    fn shape() -> ParamShape {
        ParamShape::Context
    }

    fn open(_svc: &S, ex: &Exchange) -> Result<Context, DispatchError> {
        Ok(ex.context().clone())
    }

    fn bind(slot: Context, _ex: &mut Exchange, _plan: &HandlerPlan) -> Result<Self, DispatchError> {
        Ok(slot)
    }
}

impl<S, E: Environment<S>> Param<S> for Env<E> {
    type Slot = Env<E>;

    fn shape() -> ParamShape {
        ParamShape::Environment(E::KIND)
    }

    fn open(svc: &S, ex: &Exchange) -> Result<Env<E>, DispatchError> {
        Env::open(svc, ex).map_err(DispatchError::EnvironmentOpen)
    }

    fn bind(slot: Env<E>, _ex: &mut Exchange, _plan: &HandlerPlan) -> Result<Self, DispatchError> {
        Ok(slot)
    }
}

/// Structured request argument plus the route's wildcard captures.
#[derive(Debug, Clone, PartialEq)]
pub struct Args<T> {
    pub cmd_args: Vec<String>,
    pub value: T,
}

impl<T> Deref for Args<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Args<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<S, T: DeserializeOwned + Send + 'static> Param<S> for Args<T> {
    type Slot = ();

    fn shape() -> ParamShape {
        argument(ArgDescriptor::Structured, Receipt::ByReference)
    }

    fn open(_svc: &S, _ex: &Exchange) -> Result<(), DispatchError> {
        Ok(())
    }

    fn bind(_slot: (), ex: &mut Exchange, plan: &HandlerPlan) -> Result<Self, DispatchError> {
        let (cmd_args, value) = bind_input(ex, plan)?.decode()?;
        Ok(Args { cmd_args, value })
    }
}

/// Structured argument taken by value. Accepted only in permissive mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Copied<T>(pub T);

impl<S, T: DeserializeOwned + Send + 'static> Param<S> for Copied<T> {
    type Slot = ();

    fn shape() -> ParamShape {
        argument(ArgDescriptor::Structured, Receipt::ByValue)
    }

    fn open(_svc: &S, _ex: &Exchange) -> Result<(), DispatchError> {
        Ok(())
    }

    fn bind(_slot: (), ex: &mut Exchange, plan: &HandlerPlan) -> Result<Self, DispatchError> {
        let (_, value) = bind_input(ex, plan)?.decode()?;
        Ok(Copied(value))
    }
}

/// Only the wildcard captures. The body is never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdArgs(pub Vec<String>);

impl<S> Param<S> for CmdArgs {
    type Slot = ();

    fn shape() -> ParamShape {
        argument(ArgDescriptor::CommandArgsOnly, Receipt::ByReference)
    }

    fn open(_svc: &S, _ex: &Exchange) -> Result<(), DispatchError> {
        Ok(())
    }

    fn bind(_slot: (), ex: &mut Exchange, plan: &HandlerPlan) -> Result<Self, DispatchError> {
        Ok(CmdArgs(bind_input(ex, plan)?.cmd_args))
    }
}

/// JSON body as an open map.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMap {
    pub cmd_args: Vec<String>,
    pub body: Map<String, Value>,
}

impl<S> Param<S> for RawMap {
    type Slot = ();

    fn shape() -> ParamShape {
        argument(ArgDescriptor::RawMap, Receipt::ByReference)
    }

    fn open(_svc: &S, _ex: &Exchange) -> Result<(), DispatchError> {
        Ok(())
    }

    fn bind(_slot: (), ex: &mut Exchange, plan: &HandlerPlan) -> Result<Self, DispatchError> {
        let input = bind_input(ex, plan)?;
        match input.body {
            BoundBody::RawMap(body) => Ok(RawMap {
                cmd_args: input.cmd_args,
                body,
            }),
            other => Err(unexpected("map", &other)),
        }
    }
}

/// Body bytes, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBytes {
    pub cmd_args: Vec<String>,
    pub body: Vec<u8>,
}

impl<S> Param<S> for RawBytes {
    type Slot = ();

    fn shape() -> ParamShape {
        argument(ArgDescriptor::RawBytes, Receipt::ByReference)
    }

    fn open(_svc: &S, _ex: &Exchange) -> Result<(), DispatchError> {
        Ok(())
    }

    fn bind(_slot: (), ex: &mut Exchange, plan: &HandlerPlan) -> Result<Self, DispatchError> {
        let input = bind_input(ex, plan)?;
        match input.body {
            BoundBody::Bytes(body) => Ok(RawBytes {
                cmd_args: input.cmd_args,
                body,
            }),
            other => Err(unexpected("bytes", &other)),
        }
    }
}

/// The live body reader.
#[derive(Debug)]
pub struct RawStream {
    pub cmd_args: Vec<String>,
    pub body: Body,
}

impl<S> Param<S> for RawStream {
    type Slot = ();

    fn shape() -> ParamShape {
        argument(ArgDescriptor::RawStream, Receipt::ByReference)
    }

    fn open(_svc: &S, _ex: &Exchange) -> Result<(), DispatchError> {
        Ok(())
    }

    fn bind(_slot: (), ex: &mut Exchange, plan: &HandlerPlan) -> Result<Self, DispatchError> {
        let input = bind_input(ex, plan)?;
        match input.body {
            BoundBody::Stream(body) => Ok(RawStream {
                cmd_args: input.cmd_args,
                body,
            }),
            other => Err(unexpected("stream", &other)),
        }
    }
}

/// What a handler produced, before it becomes a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No typed result; replies with an empty object.
    Empty,
    Value(Value),
}

/// A handler's return type.
pub trait HandlerOutput: 'static {
    fn results() -> Vec<ResultShape>;

    fn into_outcome(self) -> Result<Outcome, DispatchError>;
}

fn is_unit<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<()>()
}

/// `Result<(), E>` has an error result only; `Result<T, E>` has both.
impl<T, E> HandlerOutput for Result<T, E>
where
    T: Serialize + 'static,
    E: Into<HandlerError> + 'static,
{
    fn results() -> Vec<ResultShape> {
        if is_unit::<T>() {
            vec![ResultShape::Error]
        } else {
            vec![ResultShape::Value, ResultShape::Error]
        }
    }

    fn into_outcome(self) -> Result<Outcome, DispatchError> {
        match self {
            Err(err) => Err(DispatchError::Handler(err.into())),
            Ok(_) if is_unit::<T>() => Ok(Outcome::Empty),
            Ok(value) => Ok(Outcome::Value(serde_json::to_value(&value)?)),
        }
    }
}

/// No results at all. Always rejected at registration.
impl HandlerOutput for () {
    fn results() -> Vec<ResultShape> {
        Vec::new()
    }

    fn into_outcome(self) -> Result<Outcome, DispatchError> {
        Ok(Outcome::Empty)
    }
}

/// A bare value without an error. Always rejected at registration.
impl HandlerOutput for Value {
    fn results() -> Vec<ResultShape> {
        vec![ResultShape::Value]
    }

    fn into_outcome(self) -> Result<Outcome, DispatchError> {
        Ok(Outcome::Value(self))
    }
}

/// Functions usable as handlers for a service `S`.
///
/// Implemented for `Fn(&S, P1, .., Pn) -> R` up to four parameters, where
/// every `Pi` is a [`Param`] and `R` a [`HandlerOutput`]. `M` only
/// distinguishes the arities.
pub trait Handler<S, M>: Send + Sync + 'static {
    fn signature() -> Signature;

    fn invoke(&self, svc: &S, ex: &mut Exchange, plan: &HandlerPlan) -> Result<Outcome, DispatchError>;
}

macro_rules! impl_handler {
    ($($p:ident),*) => {
        #[allow(non_snake_case, unused_variables)]
        impl<S, F, R, $($p,)*> Handler<S, (R, $($p,)*)> for F
        where
            S: 'static,
            F: Fn(&S, $($p,)*) -> R + Send + Sync + 'static,
            R: HandlerOutput,
            $($p: Param<S>,)*
        {
            fn signature() -> Signature {
                Signature {
                    params: vec![$(<$p as Param<S>>::shape(),)*],
                    results: R::results(),
                }
            }

            fn invoke(
                &self,
                svc: &S,
                ex: &mut Exchange,
                plan: &HandlerPlan,
            ) -> Result<Outcome, DispatchError> {
                $(let $p = <$p as Param<S>>::open(svc, ex)?;)*
                $(let $p = <$p as Param<S>>::bind($p, ex, plan)?;)*
                (self)(svc, $($p,)*).into_outcome()
            }
        }
    };
}

impl_handler!();
impl_handler!(P1);
impl_handler!(P1, P2);
impl_handler!(P1, P2, P3);
impl_handler!(P1, P2, P3, P4);

/// Handler with its parameter types erased.
pub type BoxedHandler<S> =
    Arc<dyn Fn(&S, &mut Exchange, &HandlerPlan) -> Result<Outcome, DispatchError> + Send + Sync>;

pub(crate) fn erase<S, M, H>(handler: H) -> BoxedHandler<S>
where
    S: 'static,
    H: Handler<S, M>,
{
    Arc::new(move |svc: &S, ex: &mut Exchange, plan: &HandlerPlan| {
        handler.invoke(svc, ex, plan)
    })
}
