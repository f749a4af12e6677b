//! Container engines: lists, inline arrays, string arrays, and the
//! nullable pointer wrapper.
//!
//! All sequence models share one generic walk; the distinction between
//! LIST, NT_ARRAY, and NT_PTR_ARRAY is ownership shape in the C lineage
//! and survives here as metadata for the schema and self-check.

use crate::args::ParserArgs;
use crate::descriptor::Model;
use crate::dispatch;
use crate::error::ParseError;
use crate::registry;
use crate::tree;
use crate::TypeId;
use serde_json::Value;
use std::any::Any;

pub(crate) fn element_of(type_id: TypeId) -> Result<TypeId, ParseError> {
    match registry::find(type_id)?.model {
        Model::List { element } | Model::NtArray { element } | Model::NtPtrArray { element } => {
            Ok(element)
        }
        _ => Err(ParseError::UnknownType("sequence expected")),
    }
}

pub(crate) fn parse_sequence<E: 'static>(
    own: TypeId,
    dst: &mut dyn Any,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    let element = element_of(own)?;
    let out = dst
        .downcast_mut::<Vec<E>>()
        .ok_or(ParseError::NativeMismatch("Vec"))?;
    if src.is_null() {
        out.clear();
        return Ok(());
    }
    let items = tree::as_list(src).ok_or_else(|| ParseError::ExpectedList {
        found: tree::type_name(src),
    })?;
    out.clear();
    out.reserve(items.len());
    for (index, item) in items.iter().enumerate() {
        args.path.push_index(index);
        let mut native = match dispatch::new_native(element) {
            Ok(n) => n,
            Err(error) => {
                args.record(error);
                args.path.pop();
                continue;
            }
        };
        match dispatch::parse_into(element, native.as_mut(), item, args) {
            Ok(()) => match native.downcast::<E>() {
                Ok(value) => out.push(*value),
                Err(_) => args.record(ParseError::NativeMismatch("sequence element")),
            },
            // Bad elements are reported and skipped; the rest of the
            // sequence still parses.
            Err(error) => args.record(error),
        }
        args.path.pop();
    }
    Ok(())
}

pub(crate) fn dump_sequence<E: 'static>(
    own: TypeId,
    src: &dyn Any,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    let element = element_of(own)?;
    let items = src
        .downcast_ref::<Vec<E>>()
        .ok_or(ParseError::NativeMismatch("Vec"))?;
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        args.path.push_index(index);
        match dispatch::dump_from(element, item, args) {
            Ok(Some(value)) => out.push(value),
            Ok(None) => {}
            Err(error) => args.record(error),
        }
        args.path.pop();
    }
    Ok(Some(Value::Array(out)))
}

/// String arrays bypass the generic walk: elements coerce directly, and
/// the native form is `Vec<String>` rather than the optional leaf type.
pub(crate) fn parse_string_array(
    dst: &mut Vec<String>,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        dst.clear();
        return Ok(());
    }
    let items = tree::as_list(src).ok_or_else(|| ParseError::ExpectedList {
        found: tree::type_name(src),
    })?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(tree::coerce_string(item).ok_or_else(|| ParseError::conv("string", item))?);
    }
    *dst = out;
    Ok(())
}

pub(crate) fn dump_string_array(
    src: &Vec<String>,
    _args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(Value::Array(
        src.iter().map(|s| Value::String(s.clone())).collect(),
    )))
}

fn ptr_target(type_id: TypeId) -> Result<(TypeId, bool), ParseError> {
    match registry::find(type_id)?.model {
        Model::Ptr { target, allow_null } => Ok((target, allow_null)),
        _ => Err(ParseError::UnknownType("ptr expected")),
    }
}

pub(crate) fn parse_ptr<T: 'static>(
    own: TypeId,
    dst: &mut dyn Any,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    let (target, allow_null) = ptr_target(own)?;
    let out = dst
        .downcast_mut::<Option<T>>()
        .ok_or(ParseError::NativeMismatch("Option"))?;
    if src.is_null() && allow_null {
        *out = None;
        return Ok(());
    }
    let mut native = dispatch::new_native(target)?;
    dispatch::parse_into(target, native.as_mut(), src, args)?;
    match native.downcast::<T>() {
        Ok(value) => {
            *out = Some(*value);
            Ok(())
        }
        Err(_) => Err(ParseError::NativeMismatch("ptr target")),
    }
}

pub(crate) fn dump_ptr<T: 'static>(
    own: TypeId,
    src: &dyn Any,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    let (target, allow_null) = ptr_target(own)?;
    let value = src
        .downcast_ref::<Option<T>>()
        .ok_or(ParseError::NativeMismatch("Option"))?;
    match value {
        Some(inner) => dispatch::dump_from(target, inner, args),
        None if allow_null => Ok(Some(Value::Null)),
        None => {
            // Non-nullable pointer with nothing behind it: dump the
            // default target so the shape stays stable.
            let native = dispatch::new_native(target)?;
            dispatch::dump_from(target, native.as_ref(), args)
        }
    }
}
