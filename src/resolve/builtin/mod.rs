//! Built-in steps and validators over [`Value`].
//!
//! These are the callables a declarative config can reference out of the
//! box. Each is a plain function, so it can also be used directly in code.

pub mod checks;
pub mod identity;
pub mod math;
pub mod text;

use crate::core::types::Value;
use crate::resolve::registry::Registry;

/// Register all built-in steps and validators.
pub fn register_all(registry: &mut Registry<Value>) {
    math::register(registry);
    text::register(registry);
    identity::register(registry);
    checks::register(registry);
}
