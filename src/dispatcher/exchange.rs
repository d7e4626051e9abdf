use crate::ids::RequestId;
use crate::router::Captures;
use crate::server::{Body, RequestHead, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Slot a handler or environment can commit a raw reply into.
///
/// A committed reply replaces the default success reply, provided the
/// handler did not return an error.
#[derive(Debug, Clone, Default)]
pub struct ResponseSink {
    slot: Arc<Mutex<Option<Response>>>,
}

impl ResponseSink {
    /// Commit `response`, replacing any earlier commit.
    pub fn commit(&self, response: Response) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(response);
        }
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    pub(crate) fn take(&self) -> Option<Response> {
        self.slot.lock().ok().and_then(|mut s| s.take())
    }
}

/// Request-scoped cancellation context.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: RequestId,
    cancelled: Arc<AtomicBool>,
}

impl Context {
    #[must_use]
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Mark the request as abandoned. Set by the transport.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Per-request state shared by the binder, the environment and the handler.
///
/// Owned by the worker serving the request and never shared across requests.
#[derive(Debug)]
pub struct Exchange {
    head: RequestHead,
    captures: Captures,
    body: Option<Body>,
    sink: ResponseSink,
    context: Context,
}

impl Exchange {
    #[must_use]
    pub fn new(request_id: RequestId, head: RequestHead, captures: Captures, body: Body) -> Self {
        Self {
            head,
            captures,
            body: Some(body),
            sink: ResponseSink::default(),
            context: Context::new(request_id),
        }
    }

    #[must_use]
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    /// Wildcard captures of the matched route, in path order.
    #[must_use]
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    #[must_use]
    pub fn sink(&self) -> &ResponseSink {
        &self.sink
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.context.request_id
    }

    /// Take the body; later calls get `None`.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }
}
