//! Name resolution for config-driven pipelines.
//!
//! Contains the [`Registry`] and the built-in callables it ships with.

pub mod builtin;
pub mod registry;

pub use registry::{split_reference, Entry, Namespace, Registry};

use crate::core::error::StepResult;
use crate::core::types::Value;
use crate::validation::Outcome;

impl Registry<Value> {
    /// Create a registry pre-populated with the built-in callables.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }
}

/// Builder for creating a customized registry.
pub struct RegistryBuilder {
    registry: Registry<Value>,
    include_builtins: bool,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            include_builtins: true,
        }
    }

    /// Include or exclude built-in callables.
    pub fn with_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    /// Register a custom step.
    pub fn step<F>(mut self, namespace: &str, name: &str, f: F) -> Self
    where
        F: Fn(Value) -> StepResult<Value> + Send + Sync + 'static,
    {
        self.registry.register_step(namespace, name, f);
        self
    }

    /// Register a custom validator.
    pub fn validator<F>(mut self, namespace: &str, name: &str, f: F) -> Self
    where
        F: Fn(Value) -> StepResult<Outcome<Value>> + Send + Sync + 'static,
    {
        self.registry.register_validator(namespace, name, f);
        self
    }

    /// Build the registry.
    ///
    /// Built-ins are registered first, so a custom entry under the same
    /// reference replaces the built-in one.
    pub fn build(self) -> Registry<Value> {
        if !self.include_builtins {
            return self.registry;
        }

        let mut registry = Registry::with_builtins();
        for (reference, entry) in self.registry.entries() {
            if let Ok((namespace, name)) = split_reference(&reference) {
                match entry {
                    Entry::Step(step) => registry.insert_step(namespace, name, step.clone()),
                    Entry::Validator(validator) => {
                        registry.insert_validator(namespace, name, validator.clone())
                    }
                };
            }
        }
        registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = Registry::with_builtins();
        for reference in [
            "math.double",
            "math.negate",
            "math.add_one",
            "math.square",
            "math.abs",
            "text.to_string",
            "text.upper",
            "text.lower",
            "text.trim",
            "text.length",
            "core.identity",
        ] {
            assert!(registry.resolve_step(reference).is_ok(), "{reference}");
        }
        for reference in ["checks.not_null", "checks.is_number", "checks.is_string", "checks.non_empty"] {
            assert!(registry.resolve_validator(reference).is_ok(), "{reference}");
        }
    }

    #[test]
    fn test_builder_without_builtins() {
        let registry = RegistryBuilder::new()
            .with_builtins(false)
            .step("m", "double", builtin::math::double)
            .build();
        assert_eq!(registry.references(), vec!["m.double"]);
    }

    #[test]
    fn test_builder_overrides_builtin() {
        let registry = RegistryBuilder::new()
            .step("math", "double", |v: Value| -> StepResult<Value> { Ok(v) })
            .build();
        let step = registry.resolve_step("math.double").unwrap();
        assert_eq!(step.call(Value::Integer(3)).unwrap(), Value::Integer(3));
        assert!(registry.contains("text.upper"));
    }
}
