#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod service {
    use brrtrpc::dispatcher::{Context, Exchange};
    use brrtrpc::environment::{Env, Environment, RestEnv, RpcEnv};
    use brrtrpc::error::HandlerError;
    use brrtrpc::router::{RouteTable, RouterBuilder};
    use brrtrpc::security::AuthEnv;
    use brrtrpc::server::Response;
    use brrtrpc::typed::{Args, RawMap};
    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Deserialize)]
    pub struct FooBarArgs {
        pub a: String,
        pub b: String,
    }

    #[derive(Debug, Serialize)]
    pub struct FooBarRet {
        pub id: String,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct FooInfo {
        pub foo: String,
        pub a: String,
        pub b: String,
        pub id: String,
        pub uid: u32,
    }

    #[derive(Debug, Serialize)]
    pub struct HostsRet {
        #[serde(rename = "CmdArgs")]
        pub cmd_args: Vec<String>,
        #[serde(rename = "ReqBody")]
        pub req_body: Map<String, Value>,
    }

    /// Service state plus counters the tests inspect.
    #[derive(Default)]
    pub struct FooService {
        foos: Mutex<HashMap<String, FooInfo>>,
        pub handler_calls: AtomicUsize,
        pub opened: AtomicUsize,
        pub closed: Arc<AtomicUsize>,
    }

    impl FooService {
        pub fn stored(&self) -> usize {
            self.foos.lock().unwrap().len()
        }

        /// POST /foo/<FooArg>/bar  JSON {a, b}  ->  {id}
        pub fn post_foo_bar(
            &self,
            args: Args<FooBarArgs>,
            env: Env<RestEnv>,
        ) -> Result<FooBarRet, HandlerError> {
            self.handler_calls.fetch_add(1, Ordering::SeqCst);
            Ok(FooBarRet {
                id: format!("{}.{}.{}", env.cmd_args[0], args.a, args.b),
            })
        }

        /// Authenticated variant; ids are keyed by the caller's uid.
        pub fn post_auth_foo_bar(
            &self,
            args: Args<FooBarArgs>,
            env: Env<AuthEnv>,
        ) -> Result<FooBarRet, HandlerError> {
            self.handler_calls.fetch_add(1, Ordering::SeqCst);
            let id = format!("{}.{}.{}", env.user.uid, args.a, args.b);
            let info = FooInfo {
                foo: env.cmd_args[0].clone(),
                a: args.a.clone(),
                b: args.b.clone(),
                id: id.clone(),
                uid: env.user.uid,
            };
            self.foos.lock().unwrap().insert(id.clone(), info);
            Ok(FooBarRet { id })
        }

        /// GET /foo/<FooId>, visible to its owner only.
        pub fn get_foo_(&self, env: Env<AuthEnv>) -> Result<FooInfo, HandlerError> {
            self.handler_calls.fetch_add(1, Ordering::SeqCst);
            let foos = self.foos.lock().unwrap();
            match foos.get(&env.cmd_args[0]) {
                Some(foo) if foo.uid == env.user.uid => Ok(foo.clone()),
                _ => Err(HandlerError::status(404, "id not found")),
            }
        }

        /// POST /hosts/<IP>  JSON {<domain>: <ip>, ...}
        pub fn post_hosts_(&self, args: RawMap, env: Env<RestEnv>) -> Result<HostsRet, HandlerError> {
            Ok(HostsRet {
                cmd_args: env.cmd_args.clone(),
                req_body: args.body,
            })
        }

        pub fn get_status(&self) -> Result<(), HandlerError> {
            Ok(())
        }

        pub fn get_missing(&self) -> Result<(), HandlerError> {
            Err(HandlerError::NotFound)
        }

        pub fn get_boom(&self, _env: Env<Tracked>) -> Result<(), HandlerError> {
            panic!("boom");
        }

        pub fn get_tracked(&self, _env: Env<Tracked>) -> Result<(), HandlerError> {
            Ok(())
        }

        pub fn get_bad_json(&self) -> Result<HashMap<(u8, u8), u8>, HandlerError> {
            Ok(HashMap::from([((1, 2), 3)]))
        }

        pub fn post_created(&self, env: Env<RpcEnv>) -> Result<(), HandlerError> {
            env.sink.commit(Response::new(201, "text/plain", "created"));
            Ok(())
        }

        pub fn get_reqid(&self, ctx: Context) -> Result<Value, HandlerError> {
            Ok(serde_json::json!({ "reqid": ctx.request_id().to_string() }))
        }
    }

    /// Environment counting opens and closes on the service.
    #[derive(Debug, Default)]
    pub struct Tracked {
        closed: Option<Arc<AtomicUsize>>,
    }

    impl Environment<FooService> for Tracked {
        fn open(&mut self, svc: &FooService, _ex: &Exchange) -> Result<(), HandlerError> {
            svc.opened.fetch_add(1, Ordering::SeqCst);
            self.closed = Some(Arc::clone(&svc.closed));
            Ok(())
        }

        fn close(&mut self) {
            if let Some(closed) = &self.closed {
                closed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Unauthenticated routes.
    pub fn rest_table() -> RouteTable<FooService> {
        RouterBuilder::new()
            .method("PostFoo_Bar", FooService::post_foo_bar)
            .unwrap()
            .method("PostHosts_", FooService::post_hosts_)
            .unwrap()
            .method("GetStatus", FooService::get_status)
            .unwrap()
            .method("GetMissing", FooService::get_missing)
            .unwrap()
            .method("GetBoom", FooService::get_boom)
            .unwrap()
            .method("GetTracked", FooService::get_tracked)
            .unwrap()
            .method("GetBadJson", FooService::get_bad_json)
            .unwrap()
            .method("PostCreated", FooService::post_created)
            .unwrap()
            .method("GetReqid", FooService::get_reqid)
            .unwrap()
            .build()
    }

    /// Routes behind stub-token authentication, under `/v1`.
    pub fn auth_table() -> RouteTable<FooService> {
        RouterBuilder::new()
            .prefix("/v1")
            .method("PostFoo_Bar", FooService::post_auth_foo_bar)
            .unwrap()
            .method("GetFoo_", FooService::get_foo_)
            .unwrap()
            .build()
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::time::Duration;

    pub fn free_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    }

    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();
        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => {
                    buf.extend_from_slice(&tmp[..n]);
                    if response_complete(&buf) {
                        break;
                    }
                }
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn response_complete(buf: &[u8]) -> bool {
        let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        match length {
            Some(len) => buf.len() >= pos + 4 + len,
            None => false,
        }
    }

    pub fn parse_response(resp: &str) -> (u16, serde_json::Value) {
        let mut parts = resp.splitn(2, "\r\n\r\n");
        let headers = parts.next().unwrap_or("");
        let body = parts.next().unwrap_or("");
        let status = headers
            .lines()
            .next()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let json = serde_json::from_str(body).unwrap_or_default();
        (status, json)
    }

    pub fn json_request(method: &str, path: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut req = format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n",
            body.len()
        );
        for (name, value) in headers {
            req.push_str(&format!("{name}: {value}\r\n"));
        }
        req.push_str("\r\n");
        req.push_str(body);
        req
    }
}
