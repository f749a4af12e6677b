//! Burst buffer size codec.
//!
//! Canonical unit is GB. String input accepts the M/G/T/P suffixes and
//! the `N` suffix, which switches the count to whole nodes via the
//! `SIZE_IN_NODES` high bit.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::model::SIZE_IN_NODES;
use crate::tree;
use serde_json::{json, Value};

pub(crate) fn parse_bb_size(
    dst: &mut u64,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            *dst = 0;
            Ok(())
        }
        Value::Number(_) => {
            *dst = tree::coerce_u64(src).ok_or_else(|| ParseError::conv("size", src))?;
            Ok(())
        }
        Value::String(s) => {
            *dst = size_from_string(s)
                .ok_or_else(|| ParseError::InvalidValue(format!("bad size {s:?}")))?;
            Ok(())
        }
        _ => Err(ParseError::conv("size", src)),
    }
}

pub(crate) fn dump_bb_size(src: &u64, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    let raw = *src;
    Ok(Some(if raw & SIZE_IN_NODES != 0 {
        Value::String(format!("{}N", raw & !SIZE_IN_NODES))
    } else {
        json!(raw)
    }))
}

fn size_from_string(token: &str) -> Option<u64> {
    let token = token.trim();
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    let suffix = token[digits.len()..].trim();
    match suffix.to_ascii_uppercase().as_str() {
        "" | "G" | "GB" => Some(value),
        "M" | "MB" => Some(value.div_ceil(1024)),
        "T" | "TB" => Some(value * 1024),
        "P" | "PB" => Some(value * 1024 * 1024),
        "N" | "NODES" => Some(value | SIZE_IN_NODES),
        _ => None,
    }
}
