//! Plain string, boolean, integer, and float codecs.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::model::{INFINITE, NO_VAL};
use crate::tree;
use serde_json::{json, Value};

pub(crate) fn parse_string(
    dst: &mut Option<String>,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = None;
        return Ok(());
    }
    match tree::coerce_string(src) {
        // Empty clears, mirroring the null form, so dump output in
        // default mode parses back to the same native value.
        Some(s) if s.is_empty() => {
            *dst = None;
            Ok(())
        }
        Some(s) => {
            *dst = Some(s);
            Ok(())
        }
        None => Err(ParseError::conv("string", src)),
    }
}

pub(crate) fn dump_string(
    src: &Option<String>,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(match src {
        Some(s) => Value::String(s.clone()),
        None if args.is_complex() => Value::Null,
        None => Value::String(String::new()),
    }))
}

pub(crate) fn parse_bool(
    dst: &mut bool,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match tree::coerce_bool(src) {
        Some(b) => {
            *dst = b;
            Ok(())
        }
        None => Err(ParseError::conv("bool", src)),
    }
}

pub(crate) fn dump_bool(src: &bool, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    Ok(Some(Value::Bool(*src)))
}

pub(crate) fn parse_u16(
    dst: &mut u16,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = 0;
        return Ok(());
    }
    let v = tree::coerce_u64(src).ok_or_else(|| ParseError::conv("uint16", src))?;
    *dst = u16::try_from(v).map_err(|_| ParseError::InvalidValue(format!("{v} exceeds uint16")))?;
    Ok(())
}

pub(crate) fn dump_u16(src: &u16, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    Ok(Some(json!(*src)))
}

/// 32-bit parse saturates to the `NO_VAL` sentinel when high bits are
/// set, rather than silently truncating.
pub(crate) fn parse_u32(
    dst: &mut u32,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = 0;
        return Ok(());
    }
    let v = tree::coerce_u64(src).ok_or_else(|| ParseError::conv("uint32", src))?;
    *dst = if v > u32::MAX as u64 { NO_VAL } else { v as u32 };
    Ok(())
}

pub(crate) fn dump_u32(src: &u32, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    Ok(Some(json!(*src)))
}

pub(crate) fn parse_u64(
    dst: &mut u64,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = 0;
        return Ok(());
    }
    *dst = tree::coerce_u64(src).ok_or_else(|| ParseError::conv("uint64", src))?;
    Ok(())
}

pub(crate) fn dump_u64(src: &u64, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    Ok(Some(json!(*src)))
}

pub(crate) fn parse_i64(
    dst: &mut i64,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = 0;
        return Ok(());
    }
    *dst = tree::coerce_i64(src).ok_or_else(|| ParseError::conv("int64", src))?;
    Ok(())
}

pub(crate) fn dump_i64(src: &i64, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    Ok(Some(json!(*src)))
}

/// Parsed through the 64-bit path, then range-checked.
pub(crate) fn parse_i32(
    dst: &mut i32,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    let mut wide = 0i64;
    parse_i64(&mut wide, src, args)?;
    *dst = i32::try_from(wide)
        .map_err(|_| ParseError::InvalidValue(format!("{wide} outside int32 range")))?;
    Ok(())
}

pub(crate) fn dump_i32(src: &i32, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    Ok(Some(json!(*src)))
}

pub(crate) fn parse_f64(
    dst: &mut f64,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = NO_VAL as f64;
        return Ok(());
    }
    *dst = tree::coerce_f64(src).ok_or_else(|| ParseError::conv("float64", src))?;
    Ok(())
}

/// Sentinel and non-finite floats dump as null.
pub(crate) fn dump_f64(src: &f64, _args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    let v = *src;
    if !v.is_finite() || v == NO_VAL as f64 || v == INFINITE as f64 {
        return Ok(Some(Value::Null));
    }
    Ok(Some(tree::float_value(v)))
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
    fn test_string_null_clears() {
        let mut dst = Some("old".to_string());
        parse_string(&mut dst, &Value::Null, &mut args()).unwrap();
        assert_eq!(dst, None);
    }

    #[test]
    fn test_string_coerces_number() {
        let mut dst = None;
        parse_string(&mut dst, &json!(42), &mut args()).unwrap();
        assert_eq!(dst.as_deref(), Some("42"));
    }

    #[test]
    fn test_string_rejects_list() {
        let mut dst = None;
        let err = parse_string(&mut dst, &json!([1]), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "DATA_CONV_FAILED");
    }

    #[test]
    fn test_dump_null_string_modes() {
        use crate::args::Behavior;
        let mut plain = args();
        assert_eq!(dump_string(&None, &mut plain).unwrap(), Some(json!("")));
        let mut complex = args().with_behavior(Behavior::COMPLEX_VALUES);
        assert_eq!(dump_string(&None, &mut complex).unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_u32_saturates_to_no_val() {
        let mut dst = 0u32;
        parse_u32(&mut dst, &json!(0x1_0000_0001u64), &mut args()).unwrap();
        assert_eq!(dst, NO_VAL);
    }

    #[test]
    fn test_u32_null_is_zero() {
        let mut dst = 7u32;
        parse_u32(&mut dst, &Value::Null, &mut args()).unwrap();
        assert_eq!(dst, 0);
    }

    #[test]
    fn test_u16_rejects_overflow() {
        let mut dst = 0u16;
        let err = parse_u16(&mut dst, &json!(70000), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "INVALID_VALUE");
    }

    #[test]
    fn test_i32_range_check() {
        let mut dst = 0i32;
        parse_i32(&mut dst, &json!(-5), &mut args()).unwrap();
        assert_eq!(dst, -5);
        let err = parse_i32(&mut dst, &json!(i64::from(i32::MAX) + 1), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "INVALID_VALUE");
    }

    #[test]
    fn test_f64_null_is_sentinel() {
        let mut dst = 0.0f64;
        parse_f64(&mut dst, &Value::Null, &mut args()).unwrap();
        assert_eq!(dst, NO_VAL as f64);
        assert_eq!(dump_f64(&dst, &mut args()).unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_bool_accepts_int_and_string() {
        let mut dst = false;
        parse_bool(&mut dst, &json!(1), &mut args()).unwrap();
        assert!(dst);
        parse_bool(&mut dst, &json!("false"), &mut args()).unwrap();
        assert!(!dst);
        assert!(parse_bool(&mut dst, &json!({}), &mut args()).is_err());
    }
}
