use super::*;
use crate::error::RegistrationError;

fn arg(descriptor: ArgDescriptor) -> ParamShape {
    ParamShape::Argument(ArgSpec {
        descriptor,
        receipt: Receipt::ByReference,
    })
}

fn by_value() -> ParamShape {
    ParamShape::Argument(ArgSpec {
        descriptor: ArgDescriptor::Structured,
        receipt: Receipt::ByValue,
    })
}

fn sig(params: Vec<ParamShape>, results: Vec<ResultShape>) -> Signature {
    Signature { params, results }
}

fn strict() -> ClassifyOptions {
    ClassifyOptions::default()
}

#[test]
fn test_argument_and_environment() {
    let plan = classify(
        "PostFoo_Bar",
        &sig(
            vec![
                arg(ArgDescriptor::Structured),
                ParamShape::Environment(EnvKind::Plain),
            ],
            vec![ResultShape::Value, ResultShape::Error],
        ),
        &strict(),
    )
    .unwrap();
    assert!(!plan.has_context);
    assert_eq!(plan.env_kind, EnvKind::Plain);
    assert_eq!(plan.arg.map(|a| a.descriptor), Some(ArgDescriptor::Structured));
    assert!(plan.has_typed_result);
    assert!(plan.binder().is_some());
}

#[test]
fn test_three_plain_parameters_rejected() {
    let err = classify(
        "PostThree",
        &sig(
            vec![
                arg(ArgDescriptor::Structured),
                arg(ArgDescriptor::Structured),
                arg(ArgDescriptor::Structured),
            ],
            vec![ResultShape::Error],
        ),
        &strict(),
    )
    .unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidSignature { .. }));
}

#[test]
fn test_final_result_must_be_error() {
    for results in [
        vec![ResultShape::Value],
        vec![ResultShape::Error, ResultShape::Value],
        vec![],
        vec![ResultShape::Value, ResultShape::Value, ResultShape::Error],
    ] {
        let err = classify("GetFoo", &sig(vec![], results.clone()), &strict());
        assert!(err.is_err(), "accepted results {results:?}");
    }
}

#[test]
fn test_context_positions() {
    let trailing = classify(
        "GetFoo_",
        &sig(
            vec![ParamShape::Environment(EnvKind::Lifecycled), ParamShape::Context],
            vec![ResultShape::Error],
        ),
        &strict(),
    )
    .unwrap();
    assert!(trailing.has_context);
    assert_eq!(trailing.env_kind, EnvKind::Lifecycled);

    let leading = classify(
        "GetFoo_",
        &sig(
            vec![
                ParamShape::Context,
                arg(ArgDescriptor::CommandArgsOnly),
                ParamShape::Environment(EnvKind::Plain),
            ],
            vec![ResultShape::Error],
        ),
        &strict(),
    )
    .unwrap();
    assert!(leading.has_context);
    assert_eq!(
        leading.arg.map(|a| a.descriptor),
        Some(ArgDescriptor::CommandArgsOnly)
    );
}

#[test]
fn test_context_in_the_middle_rejected() {
    let err = classify(
        "PostFoo",
        &sig(
            vec![
                arg(ArgDescriptor::Structured),
                ParamShape::Context,
                ParamShape::Environment(EnvKind::Plain),
            ],
            vec![ResultShape::Error],
        ),
        &strict(),
    );
    assert!(err.is_err());
}

#[test]
fn test_environment_must_be_last() {
    let err = classify(
        "PostFoo",
        &sig(
            vec![
                ParamShape::Environment(EnvKind::Plain),
                arg(ArgDescriptor::Structured),
            ],
            vec![ResultShape::Error],
        ),
        &strict(),
    );
    assert!(err.is_err());
}

#[test]
fn test_by_value_needs_permissive_mode() {
    let s = sig(vec![by_value()], vec![ResultShape::Error]);
    assert!(classify("PostFoo", &s, &strict()).is_err());

    let plan = classify("PostFoo", &s, &ClassifyOptions { permissive: true }).unwrap();
    assert_eq!(plan.arg.map(|a| a.receipt), Some(Receipt::ByValue));
}

#[test]
fn test_no_params() {
    let plan = classify("GetStatus", &sig(vec![], vec![ResultShape::Error]), &strict()).unwrap();
    assert_eq!(plan.env_kind, EnvKind::None);
    assert!(!plan.has_arg());
    assert!(plan.binder().is_none());
    assert!(!plan.has_typed_result);
}
