//! Process-wide descriptor registry.
//!
//! The table is assembled once on first access and never mutated. Debug
//! builds run the full self-check during assembly; a violation is a
//! programming mistake in the tables and terminates the process.

pub(crate) mod acct;
pub(crate) mod burst;
pub(crate) mod cluster;
pub(crate) mod job;
pub(crate) mod scalars;
pub(crate) mod self_check;

use crate::descriptor::Descriptor;
use crate::error::ParseError;
use crate::TypeId;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static REGISTRY: Lazy<HashMap<TypeId, Descriptor>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for descriptor in scalars::descriptors()
        .into_iter()
        .chain(job::descriptors())
        .chain(cluster::descriptors())
        .chain(acct::descriptors())
        .chain(burst::descriptors())
    {
        let type_id = descriptor.type_id;
        if table.insert(type_id, descriptor).is_some() {
            panic!("duplicate descriptor for {}", type_id.name());
        }
    }
    if cfg!(debug_assertions) {
        let violations = self_check::check_table(&table);
        if !violations.is_empty() {
            panic!(
                "parser registry self-check failed:\n  {}",
                violations.join("\n  ")
            );
        }
    }
    tracing::debug!(descriptors = table.len(), "parser registry initialized");
    table
});

/// Look up one descriptor. `Invalid` and unregistered ids are rejected.
pub fn find(type_id: TypeId) -> Result<&'static Descriptor, ParseError> {
    if type_id == TypeId::Invalid {
        return Err(ParseError::UnknownType("Invalid"));
    }
    REGISTRY
        .get(&type_id)
        .ok_or_else(|| ParseError::UnknownType(type_id.name()))
}

/// Iterate every registered descriptor, for schema generation.
pub fn enumerate() -> impl Iterator<Item = &'static Descriptor> {
    TypeId::ALL.iter().filter_map(|id| REGISTRY.get(id))
}

/// Run the registry invariant scan, returning the violation list.
/// Empty on a correctly composed table.
pub fn self_check() -> Vec<String> {
    self_check::check_table(&REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_registered() {
        for id in TypeId::ALL {
            assert!(find(*id).is_ok(), "missing descriptor for {}", id.name());
        }
    }

    #[test]
    fn test_invalid_rejected() {
        assert_eq!(
            find(TypeId::Invalid).unwrap_err().wire_name(),
            "UNKNOWN_TYPE"
        );
    }

    #[test]
    fn test_enumerate_is_complete() {
        assert_eq!(enumerate().count(), TypeId::ALL.len());
    }

    #[test]
    fn test_self_check_passes() {
        assert_eq!(self_check(), Vec::<String>::new());
    }
}
