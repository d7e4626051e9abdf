#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Tests for loading configuration files

use brrtrpc::config::{ConfigError, DEFAULT_STACK_SIZE};
use brrtrpc::{Config, RouterBuilder};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
[router]
separator = "X"
pattern_prefix = "/api"
verbs = ["Get", "Post", "Patch"]

[server]
addr = "0.0.0.0:8080"
stack_size = "0x8000"
"#,
    );
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.router.separator, "X");
    assert_eq!(config.router.pattern_prefix.as_deref(), Some("/api"));
    assert_eq!(config.server.addr, "0.0.0.0:8080");
    assert_eq!(config.server.stack_size, 0x8000);

    let table = RouterBuilder::<()>::from_config(&config.router)
        .method("PatchFooXBar", |_: &()| Ok::<_, brrtrpc::HandlerError>(()))
        .unwrap()
        .build();
    assert!(table.find("PATCH", "/api/foo/1/bar").is_some());
}

#[test]
fn test_missing_sections_use_defaults() {
    let file = write_config("[server]\nstack_size = 32768\n");
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.server.stack_size, 32768);
    assert_eq!(config.router.separator, "_");
    assert!(config.router.verbs.is_none());

    let empty = Config::from_toml_str("").unwrap();
    assert_eq!(empty.server.stack_size, DEFAULT_STACK_SIZE);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_invalid_stack_size_is_parse_error() {
    let file = write_config("[server]\nstack_size = \"huge\"\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
