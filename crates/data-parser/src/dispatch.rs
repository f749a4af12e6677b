//! Internal dispatch: one hop from type id to vtable.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::registry;
use crate::TypeId;
use serde_json::Value;
use std::any::Any;

pub(crate) fn parse_into(
    type_id: TypeId,
    dst: &mut dyn Any,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    let desc = registry::find(type_id)?;
    (desc.vtable.parse)(dst, src, args)
}

pub(crate) fn dump_from(
    type_id: TypeId,
    src: &dyn Any,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    let desc = registry::find(type_id)?;
    (desc.vtable.dump)(src, args)
}

/// Allocate the native value a descriptor operates on.
pub(crate) fn new_native(type_id: TypeId) -> Result<Box<dyn Any>, ParseError> {
    Ok((registry::find(type_id)?.vtable.new)())
}
