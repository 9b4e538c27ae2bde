//! Pure helper functions for extracting typed parameters from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value is not the expected type, the default is returned.
//! These never fail: they always produce a usable value.
//!
//! [`check_params`] is the strict counterpart for hosts that want typos and
//! mistyped values reported instead of silently ignored.

use crate::error::EngineError;
use glam::Vec3;
use serde_json::Value;

/// Extracts an `f32` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_f32(params: &Value, name: &str, default: f32) -> f32 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .unwrap_or(default)
}

/// Extracts a `Vec3` from a three-element numeric array at `params[name]`,
/// returning `default` if missing, the wrong length, or not all numbers.
pub fn param_vec3(params: &Value, name: &str, default: Vec3) -> Vec3 {
    let Some(items) = params.get(name).and_then(Value::as_array) else {
        return default;
    };
    match items.iter().map(Value::as_f64).collect::<Option<Vec<f64>>>() {
        Some(v) if v.len() == 3 => Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32),
        _ => default,
    }
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only succeeds if the JSON value is a non-negative integer that fits in `u64`,
/// then converts to `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// JSON shape accepted for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    /// Non-negative integer.
    Integer,
    Bool,
    String,
    /// Array of exactly three numbers.
    Vec3,
}

impl ParamKind {
    pub fn name(self) -> &'static str {
        match self {
            ParamKind::Number => "number",
            ParamKind::Integer => "non-negative integer",
            ParamKind::Bool => "bool",
            ParamKind::String => "string",
            ParamKind::Vec3 => "array of 3 numbers",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamKind::Number => value.is_number(),
            ParamKind::Integer => value.is_u64(),
            ParamKind::Bool => value.is_boolean(),
            ParamKind::String => value.is_string(),
            ParamKind::Vec3 => value
                .as_array()
                .is_some_and(|a| a.len() == 3 && a.iter().all(Value::is_number)),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks that `params` is an object whose keys all appear in `known` with
/// values of the listed kind.
///
/// Returns `EngineError::ParamNotFound` for a key missing from `known`, and
/// `EngineError::ParamTypeMismatch` for a value of the wrong shape or a
/// `params` that is not an object.
pub fn check_params(params: &Value, known: &[(&str, ParamKind)]) -> Result<(), EngineError> {
    let Some(map) = params.as_object() else {
        return Err(EngineError::ParamTypeMismatch {
            name: "params".into(),
            expected: "object".into(),
            got: json_type(params).into(),
        });
    };
    for (key, value) in map {
        let kind = known
            .iter()
            .find(|(name, _)| name == key)
            .map(|&(_, kind)| kind)
            .ok_or_else(|| EngineError::ParamNotFound(key.clone()))?;
        if !kind.accepts(value) {
            return Err(EngineError::ParamTypeMismatch {
                name: key.clone(),
                expected: kind.name().into(),
                got: json_type(value).into(),
            });
        }
    }
    Ok(())
}
