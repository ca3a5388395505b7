//! Registry resolving dotted references to steps and validators.
//!
//! A reference such as `"math.double"` splits at its last `.` into a
//! namespace (`math`) and an attribute (`double`). Namespaces may themselves
//! contain dots (`"text.case.upper"` lives in namespace `text.case`).
//!
//! Lookups read the live map on every call, so re-registering or removing an
//! entry is visible to the very next resolution.

use crate::core::error::{LookupFailure, ResolveError, StepResult};
use crate::core::step::Step;
use crate::validation::{Outcome, ValidatorPipeline};
use indexmap::IndexMap;
use std::fmt;

/// A registered callable.
pub enum Entry<T> {
    /// A plain step, usable in `PIPELINE`.
    Step(Step<T>),
    /// A validator, usable in `VALIDATORS`.
    Validator(ValidatorPipeline<T>),
}

impl<T> Entry<T> {
    /// `"step"` or `"validator"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Step(_) => "step",
            Entry::Validator(_) => "validator",
        }
    }
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        match self {
            Entry::Step(step) => Entry::Step(step.clone()),
            Entry::Validator(validator) => Entry::Validator(validator.clone()),
        }
    }
}

impl<T> fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Step(step) => f.debug_tuple("Step").field(step).finish(),
            Entry::Validator(validator) => f.debug_tuple("Validator").field(validator).finish(),
        }
    }
}

/// Entries registered under one namespace, in registration order.
pub struct Namespace<T> {
    entries: IndexMap<String, Entry<T>>,
}

impl<T> Namespace<T> {
    fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Look up an attribute.
    pub fn get(&self, attribute: &str) -> Option<&Entry<T>> {
        self.entries.get(attribute)
    }

    /// Attribute names with their entries.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry<T>)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the namespace has no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry of named callables over payload type `T`.
pub struct Registry<T> {
    namespaces: IndexMap<String, Namespace<T>>,
}

impl<T: 'static> Registry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            namespaces: IndexMap::new(),
        }
    }

    /// Register a function as the step `namespace.name`.
    ///
    /// Replaces any entry already registered under that reference.
    pub fn register_step<F>(&mut self, namespace: &str, name: &str, f: F) -> &mut Self
    where
        F: Fn(T) -> StepResult<T> + Send + Sync + 'static,
    {
        let reference = format!("{}.{}", namespace, name);
        self.insert(namespace, name, Entry::Step(Step::named(reference, f)))
    }

    /// Register an existing step as `namespace.name`, renamed to that reference.
    pub fn insert_step(&mut self, namespace: &str, name: &str, step: Step<T>) -> &mut Self {
        let reference = format!("{}.{}", namespace, name);
        self.insert(namespace, name, Entry::Step(step.renamed(reference)))
    }

    /// Register a function as the validator `namespace.name`.
    pub fn register_validator<F>(&mut self, namespace: &str, name: &str, f: F) -> &mut Self
    where
        F: Fn(T) -> StepResult<Outcome<T>> + Send + Sync + 'static,
    {
        let reference = format!("{}.{}", namespace, name);
        self.insert(
            namespace,
            name,
            Entry::Validator(ValidatorPipeline::named(reference, f)),
        )
    }

    /// Register an existing validator chain as `namespace.name`, renamed to
    /// that reference.
    pub fn insert_validator(
        &mut self,
        namespace: &str,
        name: &str,
        validator: ValidatorPipeline<T>,
    ) -> &mut Self {
        let reference = format!("{}.{}", namespace, name);
        self.insert(namespace, name, Entry::Validator(validator.renamed(reference)))
    }

    fn insert(&mut self, namespace: &str, name: &str, entry: Entry<T>) -> &mut Self {
        log::trace!("registering {} '{}.{}'", entry.kind(), namespace, name);
        self.namespaces
            .entry(namespace.to_string())
            .or_insert_with(Namespace::new)
            .entries
            .insert(name.to_string(), entry);
        self
    }
}

impl<T> Registry<T> {
    /// Look up whatever is registered under `reference`.
    pub fn resolve(&self, reference: &str) -> Result<&Entry<T>, ResolveError> {
        let (namespace, attribute) = split_reference(reference)?;

        let ns = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| ResolveError::Resolution {
                reference: reference.to_string(),
                namespace: namespace.to_string(),
            })?;

        ns.get(attribute).ok_or_else(|| {
            lookup_error(reference, namespace, attribute, LookupFailure::Missing)
        })
    }

    /// Resolve `reference` to a step.
    ///
    /// A validator registered under that reference is not callable as a step
    /// and yields [`ResolveError::AttributeLookup`].
    pub fn resolve_step(&self, reference: &str) -> Result<Step<T>, ResolveError> {
        match self.resolve(reference)? {
            Entry::Step(step) => {
                log::debug!("resolved step '{}'", reference);
                Ok(step.clone())
            }
            Entry::Validator(_) => {
                let (namespace, attribute) = split_reference(reference)?;
                Err(lookup_error(reference, namespace, attribute, LookupFailure::NotAStep))
            }
        }
    }

    /// Resolve `reference` to a validator.
    pub fn resolve_validator(&self, reference: &str) -> Result<ValidatorPipeline<T>, ResolveError> {
        match self.resolve(reference)? {
            Entry::Validator(validator) => {
                log::debug!("resolved validator '{}'", reference);
                Ok(validator.clone())
            }
            Entry::Step(_) => {
                let (namespace, attribute) = split_reference(reference)?;
                Err(lookup_error(
                    reference,
                    namespace,
                    attribute,
                    LookupFailure::NotAValidator,
                ))
            }
        }
    }

    /// Check if anything is registered under `reference`.
    pub fn contains(&self, reference: &str) -> bool {
        self.resolve(reference).is_ok()
    }

    /// Get a namespace by name.
    pub fn namespace(&self, name: &str) -> Option<&Namespace<T>> {
        self.namespaces.get(name)
    }

    /// All namespace names in registration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(|s| s.as_str())
    }

    /// Every registered reference with its entry, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (String, &Entry<T>)> {
        self.namespaces.iter().flat_map(|(namespace, ns)| {
            ns.entries()
                .map(move |(name, entry)| (format!("{}.{}", namespace, name), entry))
        })
    }

    /// Every registered reference, in registration order.
    pub fn references(&self) -> Vec<String> {
        self.entries().map(|(reference, _)| reference).collect()
    }

    /// Search references containing `query`, case-insensitively.
    pub fn search(&self, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        self.entries()
            .map(|(reference, _)| reference)
            .filter(|reference| reference.to_lowercase().contains(&query))
            .collect()
    }

    /// Remove the entry under `reference`. Empty namespaces are dropped.
    pub fn unregister(&mut self, reference: &str) -> bool {
        let Ok((namespace, attribute)) = split_reference(reference) else {
            return false;
        };

        let Some(ns) = self.namespaces.get_mut(namespace) else {
            return false;
        };
        let removed = ns.entries.shift_remove(attribute).is_some();
        if ns.is_empty() {
            self.namespaces.shift_remove(namespace);
        }
        removed
    }

    /// Total number of registered entries.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(Namespace::len).sum()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl<T: 'static> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("namespaces", &self.namespaces.keys().collect::<Vec<_>>())
            .field("entries", &self.len())
            .finish()
    }
}

/// Split a dotted reference at its last `.`.
///
/// A reference without a dot, or with an empty namespace, names no locatable
/// namespace and fails with [`ResolveError::Resolution`]. The attribute may be
/// empty; looking it up then fails once the namespace has been found.
pub fn split_reference(reference: &str) -> Result<(&str, &str), ResolveError> {
    match reference.rsplit_once('.') {
        Some((namespace, attribute)) if !namespace.is_empty() => Ok((namespace, attribute)),
        Some(_) | None => Err(ResolveError::Resolution {
            reference: reference.to_string(),
            namespace: String::new(),
        }),
    }
}

fn lookup_error(
    reference: &str,
    namespace: &str,
    attribute: &str,
    reason: LookupFailure,
) -> ResolveError {
    ResolveError::AttributeLookup {
        reference: reference.to_string(),
        namespace: namespace.to_string(),
        attribute: attribute.to_string(),
        reason,
    }
}
