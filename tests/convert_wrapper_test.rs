//! Integration tests for the explicit-mapping entry point and the
//! wrapping layer it builds.

use std::collections::HashMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use argcast::{
    build_wrapper, converter, unwrap_target, utils, Args, Callable, Convert, FnTarget, Signature,
    Value,
};

fn echo(signature: Signature) -> Arc<dyn Callable> {
    Arc::new(FnTarget::new(signature, |args| {
        Ok(Value::list(args.positional))
    }))
}

#[test]
fn defaults_left_unsupplied_are_never_converted() {
    let sig = Signature::builder()
        .positional("first")
        .positional("second")
        .default(Value::none())
        .build()
        .unwrap();
    let original = echo(sig);

    let wrapped = Convert::new()
        .with("second", converter(|s| utils::toint(s).map(Value::int)))
        .apply(original.clone())
        .unwrap();

    // Only `first` supplied: the wrapper's result matches the original's.
    let args = Args::new().positional(Value::str("hello"));
    let direct = original.call(args.clone()).unwrap();
    let through = wrapped.call(args).unwrap();
    assert_eq!(direct, through);

    // The retained default object passed explicitly is also left alone.
    let default = original
        .signature()
        .param("second")
        .unwrap()
        .default()
        .unwrap()
        .clone();
    let result = wrapped
        .call(
            Args::new()
                .positional(Value::str("hello"))
                .positional(default.clone()),
        )
        .unwrap();
    assert!(result.as_list().unwrap()[1].ptr_eq(&default));
}

#[test]
fn supplied_strings_are_converted() {
    let sig = Signature::builder()
        .positional("first")
        .positional("second")
        .default(Value::none())
        .build()
        .unwrap();

    let wrapped = Convert::new()
        .with("second", converter(|s| utils::toint(s).map(Value::int)))
        .apply(echo(sig))
        .unwrap();

    let result = wrapped
        .call(
            Args::new()
                .positional(Value::str("hello"))
                .positional(Value::str("42")),
        )
        .unwrap();
    assert_eq!(
        result,
        Value::list(vec![Value::str("hello"), Value::int(42)])
    );
}

#[test]
fn boolean_tokens_convert_case_insensitively() {
    let sig = Signature::builder().positional("flag").build().unwrap();
    let wrapped = Convert::new()
        .with("flag", converter(|s| utils::tobool(s).map(Value::bool)))
        .apply(echo(sig))
        .unwrap();

    for token in ["yes", "TRUE", "On", "1", "y", "t"] {
        let result = wrapped
            .call(Args::new().positional(Value::str(token)))
            .unwrap();
        assert_eq!(result, Value::list(vec![Value::bool(true)]), "{token}");
    }
    for token in ["no", "False", "OFF", "0", "n", "f"] {
        let result = wrapped
            .call(Args::new().positional(Value::str(token)))
            .unwrap();
        assert_eq!(result, Value::list(vec![Value::bool(false)]), "{token}");
    }

    let err = wrapped
        .call(Args::new().positional(Value::str("maybe")))
        .unwrap_err();
    assert!(err.to_string().contains("invalid truth value"));
}

#[test]
fn variadic_floats_convert_after_fixed_parameters() {
    let sig = Signature::builder()
        .positional("label")
        .var_positional("values")
        .build()
        .unwrap();
    let wrapped = Convert::new()
        .with("values", converter(|s| utils::tofloat(s).map(Value::float)))
        .apply(echo(sig))
        .unwrap();

    let result = wrapped
        .call(
            Args::new()
                .positional(Value::str("series"))
                .positional(Value::str("1.5"))
                .positional(Value::str("2.5"))
                .positional(Value::str("3")),
        )
        .unwrap();
    assert_eq!(
        result,
        Value::list(vec![
            Value::str("series"),
            Value::float(1.5),
            Value::float(2.5),
            Value::float(3.0),
        ])
    );
}

#[test]
fn choice_converters_map_names_and_report_alternatives() {
    // Rework of the enum-choices usage: explicit mapping with tochoice.
    let sig = Signature::builder().positional("arg").build().unwrap();
    let wrapped = Convert::new()
        .with(
            "arg",
            utils::tochoice(
                "Choices",
                vec![
                    ("foo".to_string(), Value::int(1)),
                    ("bar".to_string(), Value::float(2.0)),
                    ("baz".to_string(), Value::str("03")),
                ],
            ),
        )
        .apply(echo(sig))
        .unwrap();

    let result = wrapped
        .call(Args::new().positional(Value::str("bar")))
        .unwrap();
    assert_eq!(result, Value::list(vec![Value::float(2.0)]));

    let err = wrapped
        .call(Args::new().positional(Value::str("bad")))
        .unwrap_err()
        .to_string();
    assert!(err.contains("invalid Choices value"));
    assert!(err.contains("foo, bar, baz"));
}

#[test]
fn automatic_conversion_follows_the_default_type() {
    let sig = Signature::builder()
        .positional("arg")
        .default(Value::bool(false))
        .build()
        .unwrap();
    let target = Arc::new(FnTarget::new(sig, |args| {
        Ok(args.keyword["arg"].clone())
    }));
    let wrapped = Convert::new().automatic(true).apply(target).unwrap();
    let result = wrapped
        .call(Args::new().keyword("arg", Value::str("on")))
        .unwrap();
    assert_eq!(result, Value::bool(true));
}

#[test]
fn automatic_file_conversion_mirrors_the_default_handle_mode() {
    use argcast::{FileHandle, OpenMode};

    let dir = tempfile::tempdir().unwrap();
    let default_path = dir.path().join("default.log");
    let default = Value::file(FileHandle::open(&default_path, OpenMode::Append).unwrap());

    let sig = Signature::builder()
        .positional("output")
        .default(default)
        .build()
        .unwrap();
    let target = Arc::new(FnTarget::new(sig, |args| {
        Ok(args.positional[0].clone())
    }));
    let wrapped = Convert::new().automatic(true).apply(target).unwrap();

    let supplied_path = dir.path().join("supplied.log");
    let result = wrapped
        .call(Args::new().positional(Value::str(supplied_path.to_str().unwrap())))
        .unwrap();
    let handle = result.as_file().unwrap();
    assert_eq!(handle.mode(), OpenMode::Append);
    assert_eq!(handle.path(), supplied_path.as_path());
}

#[test]
fn layers_nest_and_unwrap_to_the_original() {
    let sig = Signature::builder()
        .positional("count")
        .positional("ratio")
        .build()
        .unwrap();
    let original = echo(sig);

    let once = Convert::new()
        .with("count", converter(|s| utils::toint(s).map(Value::int)))
        .apply(original.clone())
        .unwrap();
    let twice = Convert::new()
        .with("ratio", converter(|s| utils::tofloat(s).map(Value::float)))
        .apply(once)
        .unwrap();

    assert!(Arc::ptr_eq(unwrap_target(&twice), &original));

    // Both layers fire: the outer converts ratio, the inner count.
    let result = twice
        .call(
            Args::new()
                .positional(Value::str("2"))
                .positional(Value::str("0.5")),
        )
        .unwrap();
    assert_eq!(result, Value::list(vec![Value::int(2), Value::float(0.5)]));
}

#[test]
fn build_wrapper_is_usable_directly() {
    let sig = Signature::builder().positional("n").build().unwrap();
    let wrapped = build_wrapper(
        echo(sig.clone()),
        sig,
        HashMap::from([(
            "n".to_string(),
            converter(|s| utils::toint(s).map(Value::int)),
        )]),
    );
    let result = wrapped
        .call(Args::new().positional(Value::str("5")))
        .unwrap();
    assert_eq!(result, Value::list(vec![Value::int(5)]));
}
