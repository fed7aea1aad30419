//! Library integration tests.

use std::collections::BTreeMap;

use serde_json::json;

use bindery::bridge;
use bindery::ui::{MessageKind, Verbosity};
use bindery::BinderyError;

#[test]
fn error_types_are_public() {
    let err = BinderyError::InvalidDebugLevel { level: 7 };
    assert!(err.to_string().contains("7"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> bindery::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn encode_round_trips_from_outside() {
    let args = vec![json!("message"), json!([1, 2, 3]), json!({"nested": true})];
    let mut kwargs = BTreeMap::new();
    kwargs.insert("code".to_string(), json!(1));

    let line = bridge::encode("abort", args.clone(), kwargs.clone()).unwrap();
    let (_, payload) = line.split_once(':').unwrap();
    let token: bridge::CommandToken =
        serde_json::from_slice(&hex::decode(payload).unwrap()).unwrap();

    assert_eq!(token.method, "abort");
    assert_eq!(token.args, args);
    assert_eq!(token.kwargs, kwargs);
}

#[test]
fn verbosity_thresholds_are_public() {
    let v = Verbosity::new(-1);
    assert!(v.allows(MessageKind::Warning));
    assert!(!v.allows(MessageKind::Info));
}

#[test]
fn platform_name_is_one_of_supported() {
    assert!(["linux", "windows", "macos"].contains(&bindery::shell::platform_name()));
}
