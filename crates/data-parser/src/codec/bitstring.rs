//! Bitmap ↔ range-list string.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::model::Bitmap;
use crate::tree;
use serde_json::Value;

pub(crate) fn parse_bitstring(
    dst: &mut Bitmap,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = Bitmap::new();
        return Ok(());
    }
    let s = tree::coerce_string(src).ok_or_else(|| ParseError::conv("bitstring", src))?;
    *dst = Bitmap::unfmt_ranges(&s).map_err(ParseError::InvalidValue)?;
    Ok(())
}

pub(crate) fn dump_bitstring(
    src: &Bitmap,
    _args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(Value::String(src.fmt_ranges())))
}
