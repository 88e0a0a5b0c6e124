use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use crate::document::{FailureAction, Parameter, ParameterLocation, SuccessAction};
use crate::error::DslError;

/// An entry that is identified within a workflow or step scope
pub trait Scoped: Clone {
    type Identity: Eq + Hash + Display;

    /// Human-readable kind used in errors
    const KIND: &'static str;

    fn identity(&self) -> Self::Identity;
}

/// `name` plus optional location, e.g. `id (query)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterIdentity {
    pub name: String,
    pub location: Option<ParameterLocation>,
}

impl Display for ParameterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} ({})", self.name, location),
            None => f.write_str(&self.name),
        }
    }
}

impl Scoped for Parameter {
    type Identity = ParameterIdentity;
    const KIND: &'static str = "parameter";

    fn identity(&self) -> ParameterIdentity {
        ParameterIdentity {
            name: self.name.clone(),
            location: self.location,
        }
    }
}

impl Scoped for SuccessAction {
    type Identity = String;
    const KIND: &'static str = "success action";

    fn identity(&self) -> String {
        self.name.clone()
    }
}

impl Scoped for FailureAction {
    type Identity = String;
    const KIND: &'static str = "failure action";

    fn identity(&self) -> String {
        self.name.clone()
    }
}

/// Identities that occur more than once, in order of their second occurrence
pub fn duplicates<T: Scoped>(entries: &[T]) -> Vec<T::Identity> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut duplicates = Vec::new();
    for entry in entries {
        let identity = entry.identity();
        if seen.contains(&identity) {
            if !duplicates.contains(&identity) {
                duplicates.push(identity);
            }
        } else {
            seen.insert(identity);
        }
    }
    duplicates
}

/// Fail on the first identity defined twice within one scope
pub fn ensure_unique<T: Scoped>(entries: &[T], scope: &str) -> Result<(), DslError> {
    match duplicates(entries).into_iter().next() {
        Some(identity) => Err(DslError::DuplicateDefinition {
            kind: T::KIND,
            identity: identity.to_string(),
            scope: scope.to_string(),
        }),
        None => Ok(()),
    }
}

/// Overlay step entries on inherited workflow entries.
///
/// A step entry replaces the inherited one with the same identity in place; new
/// identities are appended. Inherited entries are never dropped.
pub fn merge<T: Scoped>(inherited: &[T], own: &[T]) -> Vec<T> {
    let mut merged: Vec<T> = inherited.to_vec();
    for entry in own {
        let identity = entry.identity();
        match merged.iter_mut().find(|existing| existing.identity() == identity) {
            Some(existing) => *existing = entry.clone(),
            None => merged.push(entry.clone()),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn create_test_parameter(
        name: &str,
        location: Option<ParameterLocation>,
        value: i64,
    ) -> Parameter {
        Parameter {
            name: name.to_string(),
            location,
            value: Value::from(value),
            extensions: Default::default(),
        }
    }

    #[test]
    fn test_duplicate_in_one_scope() {
        let step = vec![
            create_test_parameter("id", Some(ParameterLocation::Query), 1),
            create_test_parameter("id", Some(ParameterLocation::Query), 2),
        ];
        let err = ensure_unique(&step, "step 'find'").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate parameter 'id (query)' in step 'find'"
        );
    }

    #[test]
    fn test_same_name_different_location_is_distinct() {
        let step = vec![
            create_test_parameter("id", Some(ParameterLocation::Query), 1),
            create_test_parameter("id", Some(ParameterLocation::Header), 2),
        ];
        assert!(ensure_unique(&step, "step").is_ok());
    }

    #[test]
    fn test_step_overrides_workflow() {
        let workflow = vec![
            create_test_parameter("id", Some(ParameterLocation::Query), 1),
            create_test_parameter("token", Some(ParameterLocation::Header), 9),
        ];
        let step = vec![
            create_test_parameter("id", Some(ParameterLocation::Query), 2),
            create_test_parameter("page", Some(ParameterLocation::Query), 3),
        ];

        let merged = merge(&workflow, &step);
        assert_eq!(
            merged,
            vec![
                create_test_parameter("id", Some(ParameterLocation::Query), 2),
                create_test_parameter("token", Some(ParameterLocation::Header), 9),
                create_test_parameter("page", Some(ParameterLocation::Query), 3),
            ]
        );
    }

    #[test]
    fn test_duplicates_reported_once() {
        let entries = vec![
            create_test_parameter("a", None, 1),
            create_test_parameter("a", None, 2),
            create_test_parameter("a", None, 3),
        ];
        assert_eq!(duplicates(&entries).len(), 1);
    }
}
