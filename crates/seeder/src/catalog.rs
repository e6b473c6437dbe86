//! The work-item catalog: immutable [`Specification`] records plus a
//! validated, read-only [`Catalog`] over them.
//!
//! Two representations, in the usual shape:
//!
//! - [`Specification`]: serde-friendly input record (one catalog entry).
//! - [`Catalog`]: validated, normalized in-memory structure — an ordered
//!   arena plus a key→index map built once at construction.
//!
//! The dependency relation is assumed acyclic. Acyclicity is deliberately
//! not checked: the two-pass materializer terminates and fully resolves
//! annotations regardless, so a cycle check would add a failure mode without
//! adding correctness. Unknown and duplicate keys, by contrast, mean the
//! catalog itself is malformed and are rejected here, before any remote call.

use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::SeederError;
use crate::identifiers::SpecKey;

/// One work-item specification: a node in the catalog.
///
/// Defined once, at process start, and never mutated. The `key` exists only
/// for local cross-referencing; it is never sent to the remote tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct Specification {
    /// Unique, stable local key.
    pub key: SpecKey,
    /// Issue title, sent to the tracker verbatim.
    pub title: String,
    /// Free-text background rendered at the top of the issue body.
    pub purpose: String,
    /// Ordered task checklist.
    pub tasks: Vec<String>,
    /// Ordered done-criteria checklist.
    pub done_criteria: Vec<String>,
    /// Keys of the catalog entries this one depends on. May be empty.
    #[serde(default)]
    pub depends_on: Vec<SpecKey>,
}

/// The validated catalog: every [`Specification`], in declaration order,
/// with constant-time lookup by key. Read-only after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    specs: Vec<Specification>,
    index: HashMap<SpecKey, usize>,
}

impl Catalog {
    /// Validates `specs` and builds a [`Catalog`].
    ///
    /// Rejects duplicate keys and dependency keys that match no catalog
    /// entry. Self-dependencies count as known keys and are not rejected;
    /// they render as resolved references once the entry itself is created.
    pub fn from_specs(specs: Vec<Specification>) -> Result<Self, SeederError> {
        let mut index = HashMap::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            if index.insert(spec.key.clone(), position).is_some() {
                return Err(SeederError::DuplicateKey {
                    key: spec.key.clone(),
                });
            }
        }
        for spec in &specs {
            for dependency in &spec.depends_on {
                if !index.contains_key(dependency) {
                    return Err(SeederError::UnknownDependency {
                        spec: spec.key.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }
        Ok(Self { specs, index })
    }

    /// Returns the specification for `key`, if the catalog contains it.
    pub fn get(&self, key: &SpecKey) -> Option<&Specification> {
        self.index.get(key).map(|&position| &self.specs[position])
    }

    /// Iterates specifications in declaration (catalog) order.
    pub fn iter(&self) -> impl Iterator<Item = &Specification> {
        self.specs.iter()
    }

    /// Number of specifications in the catalog.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if the catalog has no specifications.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a bare specification for tests; `deps` reference other keys.
    pub(crate) fn spec(key: &str, deps: &[&str]) -> Specification {
        Specification {
            key: SpecKey::new(key).unwrap(),
            title: format!("Title {key}"),
            purpose: format!("Purpose {key}"),
            tasks: vec![format!("task {key}.1"), format!("task {key}.2")],
            done_criteria: vec![format!("done {key}.1")],
            depends_on: deps.iter().map(|d| SpecKey::new(*d).unwrap()).collect(),
        }
    }

    #[test]
    fn builds_index_in_catalog_order() {
        let catalog = Catalog::from_specs(vec![spec("a", &[]), spec("b", &["a"])]).unwrap();
        assert_eq!(catalog.len(), 2);
        let keys: Vec<_> = catalog.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(
            catalog.get(&SpecKey::new("b").unwrap()).unwrap().title,
            "Title b"
        );
        assert!(catalog.get(&SpecKey::new("c").unwrap()).is_none());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = Catalog::from_specs(vec![spec("a", &[]), spec("a", &[])]).unwrap_err();
        assert!(matches!(err, SeederError::DuplicateKey { key } if key.as_str() == "a"));
    }

    #[test]
    fn rejects_unknown_dependency_keys() {
        let err = Catalog::from_specs(vec![spec("a", &["ghost"])]).unwrap_err();
        match err {
            SeederError::UnknownDependency { spec, dependency } => {
                assert_eq!(spec.as_str(), "a");
                assert_eq!(dependency.as_str(), "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn forward_references_are_valid() {
        // Declaration order does not have to be topological.
        let catalog = Catalog::from_specs(vec![spec("b", &["a"]), spec("a", &[])]);
        assert!(catalog.is_ok());
    }
}
