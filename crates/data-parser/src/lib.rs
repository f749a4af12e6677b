//! wlm-data-parser: declarative, versioned, bidirectional translation
//! between controller structures and the REST value tree.
//!
//! One registry of parser descriptors drives everything:
//! - `parse` populates a native struct from an incoming tree
//! - `dump` renders a native struct back to a tree
//! - `describe` emits the OpenAPI fragment for a type id
//!
//! Descriptors are immutable, process-wide, and validated by a startup
//! self-check in debug builds. Per-field diagnostics accumulate in the
//! ambient [`ParserArgs`] so one request reports every bad field.

pub mod args;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod registry;
pub mod resolvers;
pub mod schema;
pub mod tree;
pub mod version;

mod codec;
mod composite;
mod containers;
mod dispatch;
mod flags;
mod macros;

pub use args::{Behavior, Direction, ParserArgs};
pub use descriptor::{Descriptor, Model, OpenApiType, TypeId};
pub use diagnostics::{ParseDiag, ParseWarning};
pub use error::ParseError;
pub use resolvers::{Needs, Resolvers, StaticUserTable, UserGroupLookup};
pub use schema::describe;
pub use version::ProtocolVersion;

use serde_json::Value;
use std::any::Any;

fn gate(type_id: TypeId, args: &ParserArgs) -> Result<&'static Descriptor, ParseError> {
    let desc = registry::find(type_id)?;
    if !args.resolvers.satisfies(desc.needs) {
        return Err(ParseError::NotSupported("required resolver not loaded"));
    }
    Ok(desc)
}

/// Parse a tree into a caller-owned native value.
///
/// Field-level failures are recorded in `args` and parsing continues;
/// the return value is the first recorded error, if any.
pub fn parse(
    type_id: TypeId,
    dst: &mut dyn Any,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    debug_assert_eq!(args.direction, Direction::Parsing);
    let desc = gate(type_id, args)?;
    if let Err(error) = (desc.vtable.parse)(dst, src, args) {
        args.record(error);
    }
    match args.first_error() {
        Some(diag) => Err(diag.error.clone()),
        None => Ok(()),
    }
}

/// Allocate, parse, and hand back ownership. On failure the partial
/// value is dropped and the first error is returned.
pub fn parse_as<T: 'static>(
    type_id: TypeId,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<T, ParseError> {
    let desc = gate(type_id, args)?;
    let mut native = (desc.vtable.new)();
    parse(type_id, native.as_mut(), src, args)?;
    native
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| ParseError::NativeMismatch(std::any::type_name::<T>()))
}

/// Dump a native value to a tree. Shape never fails a dump; resolver
/// misses degrade per codec and are reported as warnings.
pub fn dump(type_id: TypeId, src: &dyn Any, args: &mut ParserArgs) -> Result<Value, ParseError> {
    debug_assert_eq!(args.direction, Direction::Dumping);
    let desc = gate(type_id, args)?;
    match (desc.vtable.dump)(src, args) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Ok(Value::Null),
        Err(error) => {
            args.record(error.clone());
            Err(error)
        }
    }
}

/// Typed convenience over [`dump`].
pub fn dump_value<T: 'static>(
    type_id: TypeId,
    src: &T,
    args: &mut ParserArgs,
) -> Result<Value, ParseError> {
    dump(type_id, src, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobDescription, Qos};
    use serde_json::json;

    #[test]
    fn test_needs_gate_rejects_missing_resolvers() {
        let mut args = ParserArgs::parsing(Resolvers::default());
        let err = parse_as::<JobDescription>(TypeId::JobDescription, &json!({}), &mut args)
            .unwrap_err();
        assert_eq!(err.wire_name(), "NOT_SUPPORTED");
    }

    #[test]
    fn test_invalid_type_rejected_at_entry() {
        let mut args = ParserArgs::dumping(Resolvers::default());
        let err = dump_value(TypeId::Invalid, &0u32, &mut args).unwrap_err();
        assert_eq!(err.wire_name(), "UNKNOWN_TYPE");
    }

    #[test]
    fn test_parse_as_returns_owned_value() {
        let mut args = ParserArgs::parsing(Resolvers {
            tres: Some(&[]),
            ..Default::default()
        });
        let qos: Qos = parse_as(TypeId::Qos, &json!({"name": "fast", "id": 3}), &mut args).unwrap();
        assert_eq!(qos.name.as_deref(), Some("fast"));
        assert_eq!(qos.id, 3);
    }

    #[test]
    fn test_first_error_returned_and_all_recorded() {
        let mut args = ParserArgs::parsing(Resolvers {
            tres: Some(&[]),
            ..Default::default()
        });
        let result = parse_as::<Qos>(
            TypeId::Qos,
            &json!({"name": "x", "id": {}, "priority": []}),
            &mut args,
        );
        assert!(result.is_err());
        assert_eq!(args.errors().len(), 2);
    }
}
