//! Tool input parsing
//!
//! The agent sends a JSON-shaped payload; operations receive a positional
//! [`Arguments`] array matching their declared [`ParamSpec`]s by name.
//! What happens on malformed input is governed by [`InputPolicy`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::operation::{OperationError, ParamSpec};
use crate::tool::ParamType;

/// How malformed tool input is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Reject malformed payloads, missing required parameters, type
    /// mismatches and unknown parameters with an [`ArgumentError`]
    #[default]
    Strict,
    /// Never fail: anything unusable becomes an absent argument
    Lenient,
}

impl std::str::FromStr for InputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(InputPolicy::Strict),
            "lenient" | "permissive" => Ok(InputPolicy::Lenient),
            other => Err(format!("unknown input policy: {}", other)),
        }
    }
}

/// Input-shape error for a tool call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ArgumentError {
    #[error("Malformed tool input: {0}")]
    Malformed(String),

    #[error("Tool input must be a JSON object")]
    NotAnObject,

    #[error("Missing required parameter '{param}'")]
    MissingRequired { param: String },

    #[error("Parameter '{param}' expects {expected}, got {got}")]
    TypeMismatch {
        param: String,
        expected: ParamType,
        got: String,
    },

    #[error("Unknown parameter '{param}'")]
    UnknownParameter { param: String },
}

/// Positional arguments for an operation, addressable by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    names: Vec<String>,
    values: Vec<Option<Value>>,
}

impl Arguments {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (impl Into<String>, Option<Value>)>,
    ) -> Self {
        let (names, values) = pairs.into_iter().map(|(n, v)| (n.into(), v)).unzip();
        Self { names, values }
    }

    /// One absent slot per parameter
    pub fn absent(params: &[ParamSpec]) -> Self {
        Self::from_pairs(params.iter().map(|p| (p.name.clone(), None)))
    }

    /// Parse a raw tool payload against declared parameters.
    ///
    /// Empty or whitespace-only input is treated as `{}`. Under
    /// [`InputPolicy::Lenient`] this never fails: unparseable input yields
    /// [`absent`](Self::absent) arguments and bad values become absent slots.
    pub fn parse(
        raw: &str,
        params: &[ParamSpec],
        policy: InputPolicy,
    ) -> Result<Self, ArgumentError> {
        let strict = policy == InputPolicy::Strict;
        let trimmed = raw.trim();

        let payload = if trimmed.is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => value,
                Err(e) if strict => return Err(ArgumentError::Malformed(e.to_string())),
                Err(_) => return Ok(Self::absent(params)),
            }
        };

        let map = match payload {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            _ if strict => return Err(ArgumentError::NotAnObject),
            _ => return Ok(Self::absent(params)),
        };

        if strict
            && let Some(unknown) = map.keys().find(|k| !params.iter().any(|p| &p.name == *k))
        {
            return Err(ArgumentError::UnknownParameter {
                param: unknown.clone(),
            });
        }

        let mut names = Vec::with_capacity(params.len());
        let mut values = Vec::with_capacity(params.len());

        for param in params {
            let value = match map.get(&param.name).filter(|v| !v.is_null()) {
                Some(raw_value) => match coerce(&param.param_type, raw_value) {
                    Some(value) => Some(value),
                    None if strict => {
                        return Err(ArgumentError::TypeMismatch {
                            param: param.name.clone(),
                            expected: param.param_type.clone(),
                            got: raw_value.to_string(),
                        });
                    }
                    None => None,
                },
                None if strict && !param.optional => {
                    return Err(ArgumentError::MissingRequired {
                        param: param.name.clone(),
                    });
                }
                None => None,
            };
            names.push(param.name.clone());
            values.push(value);
        }

        Ok(Self { names, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether no argument carries a value
    pub fn all_absent(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Positional access
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| n == name)?;
        self.value(index)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Deserialize an argument into `T`, `Ok(None)` when absent
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, OperationError> {
        match self.get(name) {
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                OperationError::with_source(format!("Invalid argument '{}'", name), e)
            }),
            None => Ok(None),
        }
    }

    /// Deserialize a required argument into `T`
    pub fn require<T: DeserializeOwned>(&self, name: &str) -> Result<T, OperationError> {
        self.get_as(name)?
            .ok_or_else(|| OperationError::new(format!("Missing required argument: {}", name)))
    }
}

/// Whole floats in `[I64_LOWER, I64_UPPER)` convert to `i64` exactly.
const I64_LOWER: f64 = i64::MIN as f64;
const I64_UPPER: f64 = -(i64::MIN as f64);

/// Coerce a JSON value to a parameter type, `None` when impossible
fn coerce(param_type: &ParamType, value: &Value) -> Option<Value> {
    if param_type.accepts(value) {
        return Some(value.clone());
    }

    match (param_type, value) {
        (ParamType::Text, Value::Number(_) | Value::Bool(_)) => {
            Some(Value::String(value.to_string()))
        }
        (ParamType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (ParamType::Integer, Value::Number(n)) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(f))
            .map(|f| Value::from(f as i64)),
        (ParamType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        (ParamType::Boolean, Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (ParamType::Array(item), Value::Array(values)) => values
            .iter()
            .map(|v| coerce(item, v))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => None,
    }
}
