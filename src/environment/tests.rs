use super::*;
use crate::dispatcher::Exchange;
use crate::error::HandlerError;
use crate::ids::RequestId;
use crate::router::Captures;
use crate::server::Request;
use http::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
struct Tracked {
    closed: Option<Arc<AtomicUsize>>,
    fail: bool,
}

impl Environment<Counters> for Tracked {
    fn open(&mut self, svc: &Counters, ex: &Exchange) -> Result<(), HandlerError> {
        svc.opened.fetch_add(1, Ordering::SeqCst);
        self.closed = Some(Arc::clone(&svc.closed));
        self.fail = ex.head().header("x-fail").is_some();
        if self.fail {
            return Err(HandlerError::status(401, "bad token"));
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(c) = &self.closed {
            c.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn exchange(req: Request) -> Exchange {
    let captures: Captures = ["cmd1".to_string()].into_iter().collect();
    Exchange::new(RequestId::new(), req.head, captures, req.body)
}

#[test]
fn test_close_runs_on_drop() {
    let svc = Counters::default();
    let ex = exchange(Request::new(Method::GET, "/foo/cmd1"));
    let env = Env::<Tracked>::open(&svc, &ex).unwrap();
    assert_eq!(svc.closed.load(Ordering::SeqCst), 0);
    drop(env);
    assert_eq!(svc.opened.load(Ordering::SeqCst), 1);
    assert_eq!(svc.closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_close_runs_after_failed_open() {
    let svc = Counters::default();
    let ex = exchange(Request::new(Method::GET, "/foo/cmd1").header("x-fail", "1"));
    let err = Env::<Tracked>::open(&svc, &ex).unwrap_err();
    assert_eq!(err.to_info().code, 401);
    assert_eq!(svc.closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rest_env_copies_request_data() {
    let ex = exchange(Request::new(Method::POST, "/foo/cmd1/bar"));
    let env = Env::<RestEnv>::open(&(), &ex).unwrap();
    assert_eq!(env.cmd_args, vec!["cmd1".to_string()]);
    assert_eq!(env.head.path, "/foo/cmd1/bar");
    assert_eq!(<RestEnv as Environment<()>>::KIND, crate::signature::EnvKind::Lifecycled);
    assert_eq!(<RpcEnv as Environment<()>>::KIND, crate::signature::EnvKind::Plain);
}
