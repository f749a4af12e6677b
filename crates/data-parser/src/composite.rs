//! Composite engine: walks a linked-field table to parse or dump one
//! struct.
//!
//! Error policy: every failed child is recorded as one diagnostic and
//! the walk continues, so a single request reports all of its bad
//! fields. Only a structural mismatch of this node's own input (dict
//! expected) propagates to the caller.

use crate::args::ParserArgs;
use crate::descriptor::{FieldAccessor, FieldKind, LinkedField, Model};
use crate::dispatch;
use crate::error::ParseError;
use crate::registry;
use crate::tree;
use crate::TypeId;
use serde_json::{Map, Value};
use std::any::Any;

fn fields_of(type_id: TypeId) -> Result<&'static [LinkedField], ParseError> {
    match registry::find(type_id)?.model {
        Model::Composite { fields } => Ok(fields),
        _ => Err(ParseError::UnknownType("composite expected")),
    }
}

fn parse_field(
    field: &LinkedField,
    child: TypeId,
    dst: &mut dyn Any,
    value: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match field.accessor {
        FieldAccessor::Whole => dispatch::parse_into(child, dst, value, args),
        FieldAccessor::Field { get_mut, .. } => match get_mut(dst) {
            Some(target) => dispatch::parse_into(child, target, value, args),
            None => Err(ParseError::NativeMismatch(field.native_name)),
        },
        FieldAccessor::None => Err(ParseError::NativeMismatch(field.native_name)),
    }
}

pub(crate) fn parse_struct(
    type_id: TypeId,
    dst: &mut dyn Any,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    let fields = fields_of(type_id)?;
    let dict = match tree::as_dict(src) {
        Some(d) => d,
        None => {
            // Non-dict fallback: a descriptor with exactly one required
            // linked field coerces the bare value as that field.
            let mut required = fields.iter().filter(|f| {
                f.required && matches!(f.kind, FieldKind::Linked { .. })
            });
            match (required.next(), required.next()) {
                (Some(field), None) => {
                    let FieldKind::Linked { type_id: child } = field.kind else {
                        unreachable!()
                    };
                    args.path.push_key(field.key);
                    let result = parse_field(field, child, dst, src, args);
                    args.path.pop();
                    return result;
                }
                _ => {
                    return Err(ParseError::ExpectedDict {
                        found: tree::type_name(src),
                    })
                }
            }
        }
    };

    for field in fields {
        match field.kind {
            FieldKind::Skip => {}
            FieldKind::Removed { since } => {
                if let Some(value) = dict.get(field.key) {
                    if value.is_null() {
                        continue;
                    }
                    args.path.push_key(field.key);
                    if args.version >= since {
                        args.warn(format!(
                            "Field {:?} was removed in {since}; value ignored",
                            field.key
                        ));
                    } else {
                        args.record(ParseError::RemovedField {
                            key: field.key.to_string(),
                            since,
                        });
                    }
                    args.path.pop();
                }
            }
            FieldKind::Linked { type_id: child } => match dict.get(field.key) {
                None => {
                    if field.required {
                        args.path.push_key(field.key);
                        args.record(ParseError::InvalidValue(format!(
                            "required field {:?} missing",
                            field.key
                        )));
                        args.path.pop();
                    }
                }
                Some(value) => {
                    args.path.push_key(field.key);
                    if let Some(since) = field.deprecated {
                        args.warn(format!("Field {:?} is deprecated since {since}", field.key));
                    }
                    if let Err(error) = parse_field(field, child, dst, value, args) {
                        args.record(error);
                    }
                    args.path.pop();
                }
            },
        }
    }
    Ok(())
}

pub(crate) fn dump_struct(
    type_id: TypeId,
    src: &dyn Any,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    let fields = fields_of(type_id)?;
    let mut out = Map::new();
    for field in fields {
        let FieldKind::Linked { type_id: child } = field.kind else {
            continue;
        };
        args.path.push_key(field.key);
        let dumped = match field.accessor {
            FieldAccessor::Whole => dispatch::dump_from(child, src, args),
            FieldAccessor::Field { get, .. } => match get(src) {
                Some(value) => dispatch::dump_from(child, value, args),
                None => Err(ParseError::NativeMismatch(field.native_name)),
            },
            FieldAccessor::None => Err(ParseError::NativeMismatch(field.native_name)),
        };
        match dumped {
            Ok(Some(value)) => {
                out.insert(field.key.to_string(), value);
            }
            Ok(None) => {}
            Err(error) => args.record(error),
        }
        args.path.pop();
    }
    Ok(Some(Value::Object(out)))
}
