//! The `text` namespace: string steps.

use crate::core::error::{StepError, StepResult};
use crate::core::types::{Value, ValueType};
use crate::resolve::registry::Registry;

/// Register `text.*` steps.
pub fn register(registry: &mut Registry<Value>) {
    registry
        .register_step("text", "to_string", to_string)
        .register_step("text", "upper", upper)
        .register_step("text", "lower", lower)
        .register_step("text", "trim", trim)
        .register_step("text", "length", length);
}

fn string_op(value: Value, op: impl Fn(&str) -> String) -> StepResult<Value> {
    match value {
        Value::String(s) => Ok(Value::String(op(&s))),
        other => Err(StepError::type_mismatch(ValueType::String, other.value_type())),
    }
}

/// Render any value as a string. Strings pass through unchanged.
pub fn to_string(value: Value) -> StepResult<Value> {
    Ok(Value::String(value.to_string()))
}

/// Uppercase a string.
pub fn upper(value: Value) -> StepResult<Value> {
    string_op(value, str::to_uppercase)
}

/// Lowercase a string.
pub fn lower(value: Value) -> StepResult<Value> {
    string_op(value, str::to_lowercase)
}

/// Strip leading and trailing whitespace.
pub fn trim(value: Value) -> StepResult<Value> {
    string_op(value, |s| s.trim().to_string())
}

/// Character count of a string, or element count of an array or map.
pub fn length(value: Value) -> StepResult<Value> {
    let len = match &value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Map(map) => map.len(),
        other => return Err(StepError::type_mismatch(ValueType::String, other.value_type())),
    };
    i64::try_from(len)
        .map(Value::Integer)
        .map_err(|_| StepError::Overflow("length".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(Value::Integer(-4)).unwrap(), Value::from("-4"));
        assert_eq!(to_string(Value::Float(4.0)).unwrap(), Value::from("4"));
        assert_eq!(to_string(Value::from("x")).unwrap(), Value::from("x"));
        assert_eq!(to_string(Value::Null).unwrap(), Value::from("null"));
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(upper(Value::from("abc")).unwrap(), Value::from("ABC"));
        assert_eq!(lower(Value::from("AbC")).unwrap(), Value::from("abc"));
        assert_eq!(trim(Value::from("  hi ")).unwrap(), Value::from("hi"));
        assert!(upper(Value::Integer(1)).is_err());
    }

    #[test]
    fn test_length() {
        assert_eq!(length(Value::from("héllo")).unwrap(), Value::Integer(5));
        assert_eq!(
            length(Value::Array(vec![Value::Null, Value::Null])).unwrap(),
            Value::Integer(2)
        );
        assert!(matches!(
            length(Value::Integer(3)),
            Err(StepError::TypeMismatch { .. })
        ));
    }
}
