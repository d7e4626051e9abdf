use super::*;
use crate::dispatcher::Exchange;
use crate::environment::{Env, Environment};
use crate::ids::RequestId;
use crate::router::Captures;
use crate::server::Request;
use http::Method;

const FULL_TOKEN: &str = "Stub uid=1&ut=2&app=3&suid=5&sut=6&ak=777%40&eu=%40x";

fn exchange(req: Request) -> Exchange {
    let captures: Captures = ["foo123".to_string()].into_iter().collect();
    Exchange::new(RequestId::new(), req.head, captures, req.body)
}

#[test]
fn test_parse_then_format_is_stable() {
    let user = StubTokenParser.parse(FULL_TOKEN).unwrap();
    assert_eq!(user.uid, 1);
    assert_eq!(user.utype, 2);
    assert_eq!(user.appid, 3);
    assert_eq!(user.sudoer, 5);
    assert_eq!(user.utype_su, 6);
    assert_eq!(user.access, "777@");
    assert_eq!(user.end_user, "@x");
    assert_eq!(StubTokenParser::format(&user), FULL_TOKEN);
}

#[test]
fn test_format_skips_empty_fields() {
    let mut user = SudoerInfo::default();
    user.uid = 7;
    user.utype = 4;
    user.utype_su = 9;
    // sut without suid is dropped
    assert_eq!(StubTokenParser::format_token(&user), "uid=7&ut=4");
}

#[test]
fn test_bad_tokens() {
    for header in ["Bearer abc", "Stub ut=4", "Stub uid=x&ut=4", "uid=1&ut=4"] {
        let info = StubTokenParser.parse(header).unwrap_err().to_info();
        assert_eq!(info.code, 401, "{header}");
        assert_eq!(info.message, "bad token");
    }
}

#[test]
fn test_identity_json_shape() {
    let user = StubTokenParser.parse("Stub uid=1&ut=4").unwrap();
    assert_eq!(
        serde_json::to_value(&user).unwrap(),
        serde_json::json!({"uid": 1, "ut": 4})
    );
}

#[test]
fn test_identity_decodes_from_form_and_json() {
    let from_form = StubTokenParser::parse_token("uid=8&ut=1&suid=3").unwrap();
    let from_json: SudoerInfo =
        serde_json::from_value(serde_json::json!({"uid": 8, "ut": 1, "suid": 3})).unwrap();
    assert_eq!(from_form, from_json);
    assert_eq!(from_form.user.uid, 8);
    assert_eq!(from_form.sudoer, 3);
}

#[test]
fn test_auth_env_open() {
    let ex = exchange(Request::new(Method::GET, "/foo/foo123").header("Authorization", "Stub uid=2&ut=4"));
    let env = Env::<AuthEnv>::open(&(), &ex).unwrap();
    assert_eq!(env.user.uid, 2);
    assert_eq!(env.cmd_args, vec!["foo123".to_string()]);
}

#[test]
fn test_auth_env_requires_header() {
    let ex = exchange(Request::new(Method::GET, "/foo/foo123"));
    let err = Env::<AuthEnv>::open(&(), &ex).unwrap_err();
    assert_eq!(err.to_info().code, 401);
    assert_eq!(
        <AuthEnv as Environment<()>>::KIND,
        crate::signature::EnvKind::Lifecycled
    );
}
