use super::exchange::Exchange;
use crate::error::{DispatchError, HandlerError, GENERIC_FAILURE};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::{Captures, RouteTable};
use crate::server::{Body, JsonReplier, Replier, Request, RequestHead, Response};
use crate::typed::Outcome;
use serde_json::json;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Status used when a handler panics.
pub const PANIC_STATUS: u16 = 500;

/// Runs matched handlers and turns their outcome into a response.
///
/// Holds the service, the route table and the replier, all read-only. Cloning
/// is cheap and every clone serves the same routes.
pub struct Dispatcher<S> {
    service: Arc<S>,
    table: Arc<RouteTable<S>>,
    replier: Arc<dyn Replier>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            table: Arc::clone(&self.table),
            replier: Arc::clone(&self.replier),
        }
    }
}

impl<S> fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<S: 'static> Dispatcher<S> {
    #[must_use]
    pub fn new(service: impl Into<Arc<S>>, table: RouteTable<S>) -> Self {
        Self {
            service: service.into(),
            table: Arc::new(table),
            replier: Arc::new(JsonReplier),
        }
    }

    /// Replace the default [`JsonReplier`].
    #[must_use]
    pub fn with_replier(mut self, replier: impl Replier) -> Self {
        self.replier = Arc::new(replier);
        self
    }

    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable<S> {
        &self.table
    }

    /// Serve one request.
    ///
    /// Never fails: every error, including a handler panic, becomes a reply.
    pub fn dispatch(&self, req: Request) -> Response {
        let Request { head, body } = req;
        let request_id = RequestId::from_header_or_new(head.header(REQUEST_ID_HEADER));
        let started = Instant::now();

        let Some(found) = self.table.find(head.method.as_str(), &head.path) else {
            return self.unmatched(request_id, head, body);
        };
        let route = found.route;
        let mut ex = Exchange::new(request_id, head, found.captures, body);

        // D1: handler invoked
        debug!(
            request_id = %request_id,
            handler_name = %route.name(),
            route_pattern = %route.pattern(),
            captures = ?ex.captures(),
            "Dispatching request"
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            (route.handler())(self.service.as_ref(), &mut ex, route.plan())
        }));
        let response = match result {
            Ok(Ok(outcome)) => self.success(&ex, outcome),
            Ok(Err(err)) => self.failure(route.name(), &ex, &err),
            Err(payload) => {
                let err = DispatchError::Panicked(panic_message(payload.as_ref()));
                self.failure(route.name(), &ex, &err)
            }
        };

        // D5: reply ready
        info!(
            request_id = %request_id,
            method = %ex.head().method,
            path = %ex.head().path,
            handler_name = %route.name(),
            status = response.status,
            duration_us = started.elapsed().as_micros(),
            "Request dispatched"
        );
        response
    }

    fn success(&self, ex: &Exchange, outcome: Outcome) -> Response {
        if let Some(committed) = ex.sink().take() {
            return committed;
        }
        match outcome {
            Outcome::Value(value) => self.replier.reply(200, &value),
            Outcome::Empty => self.replier.reply_with_code(200),
        }
    }

    fn failure(&self, handler_name: &str, ex: &Exchange, err: &DispatchError) -> Response {
        let request_id = ex.request_id();
        match err {
            DispatchError::EnvironmentOpen(inner) => {
                // D2: environment refused the request
                warn!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    stage = err.stage(),
                    error = %inner,
                    "Environment open failed"
                );
                self.replier.error(inner)
            }
            DispatchError::Binding(msg) => {
                // D3: argument could not be decoded
                warn!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    stage = err.stage(),
                    error = %msg,
                    "Argument binding failed"
                );
                self.replier.error(&HandlerError::status(400, msg.clone()))
            }
            DispatchError::Handler(inner) => {
                // D4: handler returned an error
                debug!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    error = %inner,
                    "Handler returned error"
                );
                self.replier.error(inner)
            }
            DispatchError::Marshal(source) => {
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    stage = err.stage(),
                    error = %source,
                    "Result marshal failed"
                );
                self.replier
                    .error(&HandlerError::status(GENERIC_FAILURE, source.to_string()))
            }
            DispatchError::Panicked(msg) => {
                // H3: handler panic caught
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    panic_message = %msg,
                    "Handler panicked - CRITICAL"
                );
                self.replier
                    .error(&HandlerError::status(PANIC_STATUS, "handler panicked"))
            }
            DispatchError::RouteNotFound { method, path } => {
                // D0: no route and no fallback
                warn!(
                    request_id = %request_id,
                    stage = err.stage(),
                    method = %method,
                    path = %path,
                    "No route matched"
                );
                not_found(method, path)
            }
        }
    }

    fn unmatched(&self, request_id: RequestId, head: RequestHead, body: Body) -> Response {
        let mut ex = Exchange::new(request_id, head, Captures::new(), body);
        let Some(default) = self.table.default_handler() else {
            let err = DispatchError::RouteNotFound {
                method: ex.head().method.to_string(),
                path: ex.head().path.clone(),
            };
            return self.failure("", &ex, &err);
        };
        debug!(request_id = %request_id, path = %ex.head().path, "Serving default handler");
        match panic::catch_unwind(AssertUnwindSafe(|| default(self.service.as_ref(), &mut ex))) {
            Ok(response) => response,
            Err(payload) => {
                error!(
                    request_id = %request_id,
                    panic_message = %panic_message(payload.as_ref()),
                    "Default handler panicked - CRITICAL"
                );
                self.replier
                    .error(&HandlerError::status(PANIC_STATUS, "handler panicked"))
            }
        }
    }
}

/// Structured 404 for requests no route matches.
#[must_use]
pub fn not_found(method: &str, path: &str) -> Response {
    Response::json(
        404,
        &json!({
            "error": "Not Found",
            "method": method,
            "path": path,
        }),
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
