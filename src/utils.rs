//! Converter helpers for use as mapping values.

use crate::error::ConvertError;
use crate::registry::{converter, Converter};
use crate::value::{FileHandle, OpenMode, Value};

/// Convert a string representation of truth to `true` or `false`.
///
/// True values are `y`, `yes`, `t`, `true`, `on` and `1`; false values are
/// `n`, `no`, `f`, `false`, `off` and `0`, all case-insensitive. Anything
/// else is an error.
pub fn tobool(value: &str) -> Result<bool, ConvertError> {
    match value.to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(ConvertError::InvalidBool(value.to_string())),
    }
}

pub fn toint(value: &str) -> Result<i64, ConvertError> {
    Ok(value.trim().parse::<i64>()?)
}

pub fn tofloat(value: &str) -> Result<f64, ConvertError> {
    Ok(value.trim().parse::<f64>()?)
}

/// Converter that splits a string on commas, dropping empty segments.
pub fn tolist() -> Converter {
    tolist_with(",", false)
}

/// Converter that splits on `sep`. Empty segments are dropped unless
/// `keep_empty` is set.
pub fn tolist_with(sep: impl Into<String>, keep_empty: bool) -> Converter {
    let sep = sep.into();
    converter(move |value| {
        let items = value
            .split(sep.as_str())
            .filter(|segment| keep_empty || !segment.is_empty())
            .map(Value::str)
            .collect();
        Ok(Value::list(items))
    })
}

/// Converter restricted to a fixed table of named choices.
///
/// `kind` names the choice set in error messages; an unrecognized token
/// fails with the valid choices listed.
pub fn tochoice(kind: impl Into<String>, choices: Vec<(String, Value)>) -> Converter {
    let kind = kind.into();
    converter(move |value| {
        for (name, choice) in &choices {
            if name == value {
                return Ok(choice.clone());
            }
        }
        let listed = choices
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ConvertError::InvalidChoice {
            kind: kind.clone(),
            value: value.to_string(),
            choices: listed,
        })
    })
}

/// Converter that opens the given path in `mode`.
pub fn tofile(mode: OpenMode) -> Converter {
    converter(move |value| Ok(Value::file(FileHandle::open(value, mode)?)))
}
