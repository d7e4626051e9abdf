use super::request::parse_request;
use super::response::{write_response, Response as DispatchResponse};
use crate::dispatcher::Dispatcher;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use tracing::warn;

/// `may_minihttp` service serving one [`Dispatcher`].
///
/// The transport clones the service once per connection; every clone shares
/// the same route table and service state.
pub struct AppService<S> {
    pub dispatcher: Dispatcher<S>,
}

impl<S> Clone for AppService<S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<S: 'static> AppService<S> {
    #[must_use]
    pub fn new(dispatcher: Dispatcher<S>) -> Self {
        Self { dispatcher }
    }
}

impl<S: Send + Sync + 'static> HttpService for AppService<S> {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = match parse_request(req) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "Malformed request");
                let reply = DispatchResponse::json(400, &json!({ "error": err.to_string() }));
                write_response(res, reply);
                return Ok(());
            }
        };
        write_response(res, self.dispatcher.dispatch(request));
        Ok(())
    }
}
