//! Unit tests for CLI commands

use crate::cli::{run, Cli, Commands};
use clap::Parser;

fn output(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run(&cli, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_derive_command_parses() {
    let cli = Cli::try_parse_from(["brrtrpc", "derive", "PostFoo_Bar", "--sep", "X"]).unwrap();
    match cli.command {
        Commands::Derive { methods, opts } => {
            assert_eq!(methods, vec!["PostFoo_Bar".to_string()]);
            assert_eq!(opts.sep, "X");
        }
        Commands::Match { .. } => panic!("Expected Derive command"),
    }
}

#[test]
fn test_derive_requires_a_method() {
    assert!(Cli::try_parse_from(["brrtrpc", "derive"]).is_err());
}

#[test]
fn test_derive_output() {
    let out = output(&["brrtrpc", "derive", "PostFoo_Bar", "GetHosts_", "--prefix", "/v1"]);
    assert_eq!(
        out,
        "POST /v1/Foo/*/Bar -> PostFoo_Bar\nGET /v1/Hosts/* -> GetHosts_\n"
    );
}

#[test]
fn test_match_first_route_wins() {
    let out = output(&[
        "brrtrpc",
        "match",
        "--route",
        "GET /bar/*",
        "--route",
        "GET /bar/xyz",
        "GET",
        "/bar/xyz",
    ]);
    assert_eq!(out, "GET /bar/* -> GET /bar/* captures=[\"xyz\"]\n");
}

#[test]
fn test_match_miss() {
    let out = output(&["brrtrpc", "match", "--method", "GetStatus", "GET", "/other"]);
    assert_eq!(out, "no route for GET /other\n");
}

#[test]
fn test_unknown_verb_is_an_error() {
    let cli = Cli::try_parse_from(["brrtrpc", "derive", "FetchFoo"]).unwrap();
    let mut out = Vec::new();
    let err = run(&cli, &mut out).unwrap_err();
    assert!(err.to_string().contains("FetchFoo"));
}
