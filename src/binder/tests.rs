use super::*;
use crate::dispatcher::Exchange;
use crate::error::DispatchError;
use crate::ids::RequestId;
use crate::router::Captures;
use crate::server::Request;
use http::Method;
use serde::Deserialize;
use serde_json::json;
use std::io::Read;

fn exchange(req: Request, captures: &[&str]) -> Exchange {
    let captures: Captures = captures.iter().map(|s| (*s).to_string()).collect();
    Exchange::new(RequestId::new(), req.head, captures, req.body)
}

#[derive(Debug, Deserialize, PartialEq)]
struct FooBar {
    a: String,
    b: String,
}

#[test]
fn test_structured_json() {
    let mut ex = exchange(
        Request::new(Method::POST, "/foo/cmd1/bar").json(&json!({"a": "1", "b": "2"})),
        &["cmd1"],
    );
    let input = RequestBinder::Structured.bind(&mut ex).unwrap();
    let (cmd_args, args): (_, FooBar) = input.decode().unwrap();
    assert_eq!(cmd_args, vec!["cmd1".to_string()]);
    assert_eq!(
        args,
        FooBar {
            a: "1".into(),
            b: "2".into()
        }
    );
}

#[test]
fn test_structured_form_body() {
    let mut ex = exchange(Request::new(Method::POST, "/foo?a=ignored").form("a=x&b=y"), &[]);
    let (_, args): (_, FooBar) = RequestBinder::Structured.bind(&mut ex).unwrap().decode().unwrap();
    assert_eq!(args.a, "x");
    assert_eq!(args.b, "y");
}

#[test]
fn test_structured_query_for_get() {
    let mut ex = exchange(Request::new(Method::GET, "/foo?a=q&b=r"), &[]);
    let (_, args): (_, FooBar) = RequestBinder::Structured.bind(&mut ex).unwrap().decode().unwrap();
    assert_eq!(args.a, "q");
    assert_eq!(args.b, "r");
}

#[test]
fn test_malformed_json_is_binding_error() {
    let mut ex = exchange(
        Request::new(Method::POST, "/foo")
            .header("content-type", "application/json")
            .body(crate::server::Body::from_bytes("{not json")),
        &[],
    );
    let err = RequestBinder::Structured
        .bind(&mut ex)
        .unwrap()
        .decode::<FooBar>()
        .unwrap_err();
    assert!(matches!(err, DispatchError::Binding(_)));
}

#[test]
fn test_raw_map_requires_json() {
    let mut ex = exchange(Request::new(Method::POST, "/hosts/1.2.3.4").form("a=b"), &["1.2.3.4"]);
    let err = RequestBinder::RawMap.bind(&mut ex).unwrap_err();
    assert_eq!(err.to_string(), "invalid argument");

    let mut ex = exchange(
        Request::new(Method::POST, "/hosts/1.2.3.4").json(&json!({"a.com": "1.2.3.4"})),
        &["1.2.3.4"],
    );
    let input = RequestBinder::RawMap.bind(&mut ex).unwrap();
    assert_eq!(input.cmd_args, vec!["1.2.3.4".to_string()]);
    match input.body {
        BoundBody::RawMap(map) => assert_eq!(map.get("a.com"), Some(&json!("1.2.3.4"))),
        other => panic!("unexpected body {other:?}"),
    }
}

#[test]
fn test_command_args_only_leaves_body_unread() {
    let mut ex = exchange(
        Request::new(Method::POST, "/foo/x").json(&json!({"a": 1})),
        &["x"],
    );
    let input = RequestBinder::CommandArgsOnly.bind(&mut ex).unwrap();
    assert!(matches!(input.body, BoundBody::None));
    assert_eq!(input.cmd_args, vec!["x".to_string()]);
    assert!(ex.take_body().is_some());
}

#[test]
fn test_raw_bytes_and_stream() {
    let mut ex = exchange(
        Request::new(Method::PUT, "/blob").body(crate::server::Body::from_bytes("abc")),
        &[],
    );
    match RequestBinder::RawBytes.bind(&mut ex).unwrap().body {
        BoundBody::Bytes(b) => assert_eq!(b, b"abc"),
        other => panic!("unexpected body {other:?}"),
    }

    let mut ex = exchange(
        Request::new(Method::PUT, "/blob").body(crate::server::Body::from_bytes("xyz")),
        &[],
    );
    match RequestBinder::RawStream.bind(&mut ex).unwrap().body {
        BoundBody::Stream(mut s) => {
            let mut text = String::new();
            s.read_to_string(&mut text).unwrap();
            assert_eq!(text, "xyz");
        }
        other => panic!("unexpected body {other:?}"),
    }
}
