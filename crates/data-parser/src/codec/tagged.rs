//! Offset- and tag-encoded job fields: nice, specialized cores/threads,
//! and the parse-only hold shorthand.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::model::{Tri, TriU32, CORE_SPEC_THREAD, NICE_OFFSET};
use crate::tree;
use serde_json::{json, Value};

// ---------------------------------------------------------------------
// nice: wire is signed, native stores value + NICE_OFFSET unsigned
// ---------------------------------------------------------------------

const NICE_RANGE: i64 = NICE_OFFSET as i64 - 3;

pub(crate) fn parse_nice(
    dst: &mut u32,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = NICE_OFFSET;
        return Ok(());
    }
    let v = tree::coerce_i64(src).ok_or_else(|| ParseError::conv("nice", src))?;
    if v.abs() > NICE_RANGE {
        return Err(ParseError::InvalidNice(v));
    }
    *dst = (NICE_OFFSET as i64 + v) as u32;
    Ok(())
}

pub(crate) fn dump_nice(src: &u32, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    Ok(Some(json!(*src as i64 - NICE_OFFSET as i64)))
}

// ---------------------------------------------------------------------
// specialized cores / threads: one 16-bit field, high bit = threads
// ---------------------------------------------------------------------

pub(crate) fn parse_core_spec(
    dst: &mut u16,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        return Ok(());
    }
    let v = tree::coerce_u64(src).ok_or_else(|| ParseError::conv("core count", src))?;
    if v >= CORE_SPEC_THREAD as u64 {
        return Err(ParseError::InvalidCoreCount(v));
    }
    // Zero means unspecified and never overwrites the sibling variant.
    if v != 0 {
        *dst = v as u16;
    }
    Ok(())
}

pub(crate) fn parse_thread_spec(
    dst: &mut u16,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        return Ok(());
    }
    let v = tree::coerce_u64(src).ok_or_else(|| ParseError::conv("thread count", src))?;
    if v >= CORE_SPEC_THREAD as u64 {
        return Err(ParseError::BadThreadPerCore(v));
    }
    if v != 0 {
        *dst = v as u16 | CORE_SPEC_THREAD;
    }
    Ok(())
}

/// The inactive variant dumps 0.
pub(crate) fn dump_core_spec(
    src: &u16,
    _args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(if *src & CORE_SPEC_THREAD == 0 {
        json!(*src)
    } else {
        json!(0)
    }))
}

pub(crate) fn dump_thread_spec(
    src: &u16,
    _args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(if *src & CORE_SPEC_THREAD != 0 {
        json!(*src & !CORE_SPEC_THREAD)
    } else {
        json!(0)
    }))
}

// ---------------------------------------------------------------------
// hold: parse-only shorthand driving the priority field
// ---------------------------------------------------------------------

pub(crate) fn parse_hold(
    dst: &mut TriU32,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        return Ok(());
    }
    let held = tree::coerce_bool(src).ok_or_else(|| ParseError::conv("hold", src))?;
    *dst = if held { Tri::Set(0) } else { Tri::Unset };
    Ok(())
}

/// Disabled direction: structured warning, key omitted.
pub(crate) fn dump_hold(
    _src: &TriU32,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    args.warn("hold is not supported by this version for dumping");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::Resolvers;
    use pretty_assertions::assert_eq;

    fn args<'a>() -> ParserArgs<'a> {
        ParserArgs::parsing(Resolvers::default())
    }

    #[test]
    fn test_nice_offsets() {
        let mut dst = 0u32;
        parse_nice(&mut dst, &json!(-10), &mut args()).unwrap();
        assert_eq!(dst, NICE_OFFSET - 10);
        assert_eq!(
            dump_nice(&NICE_OFFSET, &mut args()).unwrap(),
            Some(json!(0))
        );
    }

    #[test]
    fn test_nice_out_of_range() {
        let mut dst = 0u32;
        let err = parse_nice(&mut dst, &json!(2_147_483_646i64), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "INVALID_NICE");
    }

    #[test]
    fn test_nice_round_trip() {
        let mut native = 0u32;
        parse_nice(&mut native, &json!(42), &mut args()).unwrap();
        assert_eq!(dump_nice(&native, &mut args()).unwrap(), Some(json!(42)));
    }

    #[test]
    fn test_core_vs_thread_spec() {
        let mut field = 0u16;
        parse_core_spec(&mut field, &json!(4), &mut args()).unwrap();
        assert_eq!(field, 4);
        assert_eq!(dump_core_spec(&field, &mut args()).unwrap(), Some(json!(4)));
        assert_eq!(dump_thread_spec(&field, &mut args()).unwrap(), Some(json!(0)));

        parse_thread_spec(&mut field, &json!(2), &mut args()).unwrap();
        assert_eq!(field, 2 | CORE_SPEC_THREAD);
        assert_eq!(dump_core_spec(&field, &mut args()).unwrap(), Some(json!(0)));
        assert_eq!(dump_thread_spec(&field, &mut args()).unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_spec_range_errors() {
        let mut field = 0u16;
        let err = parse_core_spec(&mut field, &json!(0x8000), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "INVALID_CORE_CNT");
        let err = parse_thread_spec(&mut field, &json!(0x9000), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "BAD_THREAD_PER_CORE");
    }

    #[test]
    fn test_hold_sets_priority() {
        let mut prio = TriU32::Unset;
        parse_hold(&mut prio, &json!(true), &mut args()).unwrap();
        assert_eq!(prio, Tri::Set(0));
        parse_hold(&mut prio, &json!(false), &mut args()).unwrap();
        assert_eq!(prio, Tri::Unset);

        let mut a = args();
        assert_eq!(dump_hold(&prio, &mut a).unwrap(), None);
        assert_eq!(a.warnings().len(), 1);
    }
}
