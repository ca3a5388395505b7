//! The `math` namespace: numeric steps.
//!
//! Integers use checked arithmetic and fail with [`StepError::Overflow`]
//! instead of wrapping. Floats follow IEEE semantics.

use crate::core::error::{StepError, StepResult};
use crate::core::types::{Value, ValueType};
use crate::resolve::registry::Registry;

/// Register `math.*` steps.
pub fn register(registry: &mut Registry<Value>) {
    registry
        .register_step("math", "double", double)
        .register_step("math", "negate", negate)
        .register_step("math", "add_one", add_one)
        .register_step("math", "square", square)
        .register_step("math", "abs", abs);
}

// Apply `int` to integers and `float` to floats; anything else is a mismatch.
fn numeric(
    name: &str,
    value: Value,
    int: impl Fn(i64) -> Option<i64>,
    float: impl Fn(f64) -> f64,
) -> StepResult<Value> {
    match value {
        Value::Integer(i) => int(i)
            .map(Value::Integer)
            .ok_or_else(|| StepError::Overflow(name.to_string())),
        Value::Float(x) => Ok(Value::Float(float(x))),
        other => Err(StepError::type_mismatch(ValueType::Number, other.value_type())),
    }
}

/// Multiply by two.
pub fn double(value: Value) -> StepResult<Value> {
    numeric("double", value, |i| i.checked_mul(2), |x| x * 2.0)
}

/// Flip the sign.
pub fn negate(value: Value) -> StepResult<Value> {
    numeric("negate", value, i64::checked_neg, |x| -x)
}

/// Add one.
pub fn add_one(value: Value) -> StepResult<Value> {
    numeric("add_one", value, |i| i.checked_add(1), |x| x + 1.0)
}

/// Multiply by itself.
pub fn square(value: Value) -> StepResult<Value> {
    numeric("square", value, |i| i.checked_mul(i), |x| x * x)
}

/// Absolute value.
pub fn abs(value: Value) -> StepResult<Value> {
    numeric("abs", value, i64::checked_abs, f64::abs)
}
