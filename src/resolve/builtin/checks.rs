//! The `checks` namespace: validators.
//!
//! A rejected value becomes a failure whose payload is the reason, so the
//! config runner can report it verbatim.

use crate::core::error::StepResult;
use crate::core::types::{Value, ValueType};
use crate::resolve::registry::Registry;
use crate::validation::Outcome;

/// Register `checks.*` validators.
pub fn register(registry: &mut Registry<Value>) {
    registry
        .register_validator("checks", "not_null", not_null)
        .register_validator("checks", "is_number", is_number)
        .register_validator("checks", "is_string", is_string)
        .register_validator("checks", "non_empty", non_empty);
}

fn reject(reason: String) -> StepResult<Outcome<Value>> {
    Ok(Outcome::failure(Value::String(reason)))
}

/// Reject `null`.
pub fn not_null(value: Value) -> StepResult<Outcome<Value>> {
    if value.is_null() {
        return reject("DATA must not be null".to_string());
    }
    Ok(Outcome::success(value))
}

fn expect_type(expected: ValueType, value: Value) -> StepResult<Outcome<Value>> {
    let actual = value.value_type();
    if !expected.accepts(actual) {
        return reject(format!("expected a {}, got {}", expected, actual));
    }
    Ok(Outcome::success(value))
}

/// Reject anything that is not an integer or float.
pub fn is_number(value: Value) -> StepResult<Outcome<Value>> {
    expect_type(ValueType::Number, value)
}

/// Reject anything that is not a string.
pub fn is_string(value: Value) -> StepResult<Outcome<Value>> {
    expect_type(ValueType::String, value)
}

/// Reject empty strings, arrays and maps. Other values pass.
pub fn non_empty(value: Value) -> StepResult<Outcome<Value>> {
    let empty = match &value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return reject(format!("{} must not be empty", value.value_type()));
    }
    Ok(Outcome::success(value))
}
