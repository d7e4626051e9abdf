use crate::dispatcher::{Exchange, ResponseSink};
use crate::error::HandlerError;
use crate::server::RequestHead;
use crate::signature::EnvKind;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Per-call environment with an open/close lifecycle.
pub trait Environment<S>: Default + Send + 'static {
    const KIND: EnvKind = EnvKind::Lifecycled;

    /// Fill the environment for one request. An error aborts the dispatch.
    fn open(&mut self, svc: &S, ex: &Exchange) -> Result<(), HandlerError>;

    /// Release what `open` acquired. Runs even if `open` failed.
    fn close(&mut self) {}
}

/// Guard handed to the handler; closes the environment on drop.
pub struct Env<E> {
    inner: E,
    close: fn(&mut E),
}

impl<E> Env<E> {
    /// Open a fresh `E`. On failure the guard is dropped, so `close` still runs.
    pub(crate) fn open<S>(svc: &S, ex: &Exchange) -> Result<Self, HandlerError>
    where
        E: Environment<S>,
    {
        let mut guard = Env {
            inner: E::default(),
            close: <E as Environment<S>>::close,
        };
        guard.inner.open(svc, ex)?;
        Ok(guard)
    }
}

impl<E> Deref for Env<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.inner
    }
}

impl<E> DerefMut for Env<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.inner
    }
}

impl<E> Drop for Env<E> {
    fn drop(&mut self) {
        (self.close)(&mut self.inner);
    }
}

impl<E: fmt::Debug> fmt::Debug for Env<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Env").field(&self.inner).finish()
    }
}

/// Response sink plus request head, nothing else.
#[derive(Debug, Default)]
pub struct RpcEnv {
    pub sink: ResponseSink,
    pub head: RequestHead,
}

impl<S> Environment<S> for RpcEnv {
    const KIND: EnvKind = EnvKind::Plain;

    fn open(&mut self, _svc: &S, ex: &Exchange) -> Result<(), HandlerError> {
        self.sink = ex.sink().clone();
        self.head = ex.head().clone();
        Ok(())
    }
}

/// [`RpcEnv`] plus the wildcard captures of the matched route.
#[derive(Debug, Default)]
pub struct RestEnv {
    pub sink: ResponseSink,
    pub head: RequestHead,
    pub cmd_args: Vec<String>,
}

impl<S> Environment<S> for RestEnv {
    fn open(&mut self, _svc: &S, ex: &Exchange) -> Result<(), HandlerError> {
        self.sink = ex.sink().clone();
        self.head = ex.head().clone();
        self.cmd_args = ex.captures().to_vec();
        Ok(())
    }
}
