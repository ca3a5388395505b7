//! The `core` namespace.

use crate::core::error::StepResult;
use crate::core::types::Value;
use crate::resolve::registry::Registry;

/// Register `core.*` steps.
pub fn register(registry: &mut Registry<Value>) {
    registry.register_step("core", "identity", identity);
}

/// Return the input unchanged.
pub fn identity(value: Value) -> StepResult<Value> {
    Ok(value)
}
