//! Tri-state wrapped numerics.
//!
//! Default wire form is the structured object `{set, infinite, number}`.
//! Parse additionally accepts null (unset), a bare numeric (set), the
//! per-width sentinel values, and, under COMPLEX_VALUES, the bare
//! strings "Infinity" / "∞". COMPLEX_VALUES dumps collapse to the scalar
//! form: number, "Infinity", or null.

use crate::args::ParserArgs;
use crate::codec::time::parse_time_string;
use crate::error::ParseError;
use crate::model::{
    Tri, TriBool, TriF64, TriI64, TriTime, TriU16, TriU32, TriU64, INFINITE, INFINITE16,
    INFINITE64, NO_VAL, NO_VAL16, NO_VAL64,
};
use crate::tree;
use serde_json::{json, Value};

/// Structural classification shared by every width.
enum TriForm<'v> {
    Unset,
    Infinite,
    Number(&'v Value),
}

fn classify<'v>(src: &'v Value, args: &ParserArgs) -> Result<TriForm<'v>, ParseError> {
    match src {
        Value::Null => Ok(TriForm::Unset),
        Value::String(s) if args.is_complex() && is_infinity_token(s) => Ok(TriForm::Infinite),
        Value::Object(map) => {
            if map
                .get("infinite")
                .and_then(tree::coerce_bool)
                .unwrap_or(false)
            {
                return Ok(TriForm::Infinite);
            }
            let set = map.get("set").and_then(tree::coerce_bool).unwrap_or(true);
            match map.get("number") {
                Some(n) if set && !n.is_null() => Ok(TriForm::Number(n)),
                _ => Ok(TriForm::Unset),
            }
        }
        other => Ok(TriForm::Number(other)),
    }
}

fn is_infinity_token(s: &str) -> bool {
    s == "∞" || s.eq_ignore_ascii_case("infinity") || s.eq_ignore_ascii_case("infinite")
}

fn tri_object(set: bool, infinite: bool, number: Value) -> Value {
    json!({ "set": set, "infinite": infinite, "number": number })
}

/// Dump helper: `number` is the payload rendering when set, `zero` the
/// filler for the other states.
fn dump_tri_with(
    args: &ParserArgs,
    state: (bool, bool),
    number: Value,
    zero: Value,
) -> Option<Value> {
    let (set, infinite) = state;
    if args.is_complex() {
        return Some(if infinite {
            json!("Infinity")
        } else if set {
            number
        } else {
            Value::Null
        });
    }
    Some(if set {
        tri_object(true, false, number)
    } else {
        tri_object(false, infinite, zero)
    })
}

macro_rules! dump_states {
    ($src:expr, $args:expr, $render:expr, $zero:expr) => {
        match $src {
            Tri::Set(n) => dump_tri_with($args, (true, false), $render(*n), $zero),
            Tri::Infinite => dump_tri_with($args, (false, true), $zero, $zero),
            Tri::Unset => dump_tri_with($args, (false, false), $zero, $zero),
        }
    };
}

// ---------------------------------------------------------------------
// u16
// ---------------------------------------------------------------------

pub(crate) fn parse_tri_u16(
    dst: &mut TriU16,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match classify(src, args)? {
        TriForm::Unset => Tri::Unset,
        TriForm::Infinite => Tri::Infinite,
        TriForm::Number(v) => {
            let n = tree::coerce_u64(v).ok_or_else(|| ParseError::conv("uint16", v))?;
            if n == NO_VAL16 as u64 {
                Tri::Unset
            } else if n == INFINITE16 as u64 {
                Tri::Infinite
            } else if n > u16::MAX as u64 {
                return Err(ParseError::InvalidValue(format!("{n} exceeds uint16")));
            } else {
                Tri::Set(n as u16)
            }
        }
    };
    Ok(())
}

pub(crate) fn dump_tri_u16(
    src: &TriU16,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(dump_states!(src, args, |n: u16| json!(n), json!(0)))
}

// ---------------------------------------------------------------------
// u32
// ---------------------------------------------------------------------

pub(crate) fn parse_tri_u32(
    dst: &mut TriU32,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match classify(src, args)? {
        TriForm::Unset => Tri::Unset,
        TriForm::Infinite => Tri::Infinite,
        TriForm::Number(v) => {
            let n = tree::coerce_u64(v).ok_or_else(|| ParseError::conv("uint32", v))?;
            if n == NO_VAL as u64 {
                Tri::Unset
            } else if n == INFINITE as u64 {
                Tri::Infinite
            } else if n > u32::MAX as u64 {
                return Err(ParseError::InvalidValue(format!("{n} exceeds uint32")));
            } else {
                Tri::Set(n as u32)
            }
        }
    };
    Ok(())
}

pub(crate) fn dump_tri_u32(
    src: &TriU32,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(dump_states!(src, args, |n: u32| json!(n), json!(0)))
}

// ---------------------------------------------------------------------
// u64
// ---------------------------------------------------------------------

pub(crate) fn parse_tri_u64(
    dst: &mut TriU64,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match classify(src, args)? {
        TriForm::Unset => Tri::Unset,
        TriForm::Infinite => Tri::Infinite,
        TriForm::Number(v) => {
            let n = tree::coerce_u64(v).ok_or_else(|| ParseError::conv("uint64", v))?;
            if n == NO_VAL64 {
                Tri::Unset
            } else if n == INFINITE64 {
                Tri::Infinite
            } else {
                Tri::Set(n)
            }
        }
    };
    Ok(())
}

pub(crate) fn dump_tri_u64(
    src: &TriU64,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(dump_states!(src, args, |n: u64| json!(n), json!(0)))
}

// ---------------------------------------------------------------------
// i64: no numeric sentinels; the wide unsigned sentinels alias real
// negative values here, so only the structured forms signal the states.
// ---------------------------------------------------------------------

pub(crate) fn parse_tri_i64(
    dst: &mut TriI64,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match classify(src, args)? {
        TriForm::Unset => Tri::Unset,
        TriForm::Infinite => Tri::Infinite,
        TriForm::Number(v) => {
            Tri::Set(tree::coerce_i64(v).ok_or_else(|| ParseError::conv("int64", v))?)
        }
    };
    Ok(())
}

pub(crate) fn dump_tri_i64(
    src: &TriI64,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(dump_states!(src, args, |n: i64| json!(n), json!(0)))
}

// ---------------------------------------------------------------------
// f64
// ---------------------------------------------------------------------

pub(crate) fn parse_tri_f64(
    dst: &mut TriF64,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match classify(src, args)? {
        TriForm::Unset => Tri::Unset,
        TriForm::Infinite => Tri::Infinite,
        TriForm::Number(v) => {
            let n = tree::coerce_f64(v).ok_or_else(|| ParseError::conv("float64", v))?;
            if n == NO_VAL as f64 {
                Tri::Unset
            } else if n.is_infinite() || n == INFINITE as f64 {
                Tri::Infinite
            } else {
                Tri::Set(n)
            }
        }
    };
    Ok(())
}

pub(crate) fn dump_tri_f64(
    src: &TriF64,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(dump_states!(src, args, tree::float_value, json!(0.0)))
}

// ---------------------------------------------------------------------
// bool (16-bit backed in the wire protocol)
// ---------------------------------------------------------------------

pub(crate) fn parse_tri_bool(
    dst: &mut TriBool,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match classify(src, args)? {
        TriForm::Unset => Tri::Unset,
        TriForm::Infinite => Tri::Infinite,
        TriForm::Number(v) => {
            Tri::Set(tree::coerce_bool(v).ok_or_else(|| ParseError::conv("bool", v))?)
        }
    };
    Ok(())
}

pub(crate) fn dump_tri_bool(
    src: &TriBool,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(dump_states!(src, args, |n: bool| json!(n), json!(false)))
}

// ---------------------------------------------------------------------
// timestamp: the numeric path additionally accepts time strings
// ---------------------------------------------------------------------

pub(crate) fn parse_tri_time(
    dst: &mut TriTime,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match classify(src, args)? {
        TriForm::Unset => Tri::Unset,
        TriForm::Infinite => Tri::Infinite,
        TriForm::Number(v) => {
            let seconds = match v {
                Value::String(s) => parse_time_string(s)
                    .ok_or_else(|| ParseError::InvalidValue(format!("unrecognized time {s:?}")))?,
                other => tree::coerce_i64(other)
                    .ok_or_else(|| ParseError::conv("timestamp", other))?,
            };
            if seconds as u64 == NO_VAL64 {
                Tri::Unset
            } else {
                Tri::Set(seconds)
            }
        }
    };
    Ok(())
}

pub(crate) fn dump_tri_time(
    src: &TriTime,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(dump_states!(src, args, |n: i64| json!(n), json!(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Behavior;
    use crate::resolvers::Resolvers;
    use pretty_assertions::assert_eq;

    fn args<'a>() -> ParserArgs<'a> {
        ParserArgs::parsing(Resolvers::default())
    }

    fn complex<'a>() -> ParserArgs<'a> {
        ParserArgs::parsing(Resolvers::default()).with_behavior(Behavior::COMPLEX_VALUES)
    }

    #[test]
    fn test_object_round_trip() {
        let mut dst = TriU32::Unset;
        parse_tri_u32(&mut dst, &json!({"set": true, "infinite": false, "number": 4096}), &mut args())
            .unwrap();
        assert_eq!(dst, Tri::Set(4096));
        assert_eq!(
            dump_tri_u32(&dst, &mut args()).unwrap(),
            Some(json!({"set": true, "infinite": false, "number": 4096}))
        );
    }

    #[test]
    fn test_bare_number_and_null() {
        let mut dst = TriU32::Unset;
        parse_tri_u32(&mut dst, &json!(17), &mut args()).unwrap();
        assert_eq!(dst, Tri::Set(17));
        parse_tri_u32(&mut dst, &Value::Null, &mut args()).unwrap();
        assert_eq!(dst, Tri::Unset);
    }

    #[test]
    fn test_numeric_sentinels() {
        let mut dst = TriU32::Unset;
        parse_tri_u32(&mut dst, &json!(NO_VAL), &mut args()).unwrap();
        assert_eq!(dst, Tri::Unset);
        parse_tri_u32(&mut dst, &json!(INFINITE), &mut args()).unwrap();
        assert_eq!(dst, Tri::Infinite);

        let mut d16 = TriU16::Unset;
        parse_tri_u16(&mut d16, &json!(INFINITE16), &mut args()).unwrap();
        assert_eq!(d16, Tri::Infinite);
    }

    #[test]
    fn test_infinity_string_complex_only() {
        let mut dst = TriU32::Unset;
        parse_tri_u32(&mut dst, &json!("Infinity"), &mut complex()).unwrap();
        assert_eq!(dst, Tri::Infinite);
        // Without COMPLEX_VALUES the string is not a number.
        assert!(parse_tri_u32(&mut dst, &json!("Infinity"), &mut args()).is_err());
    }

    #[test]
    fn test_complex_dump_forms() {
        assert_eq!(
            dump_tri_u32(&Tri::Set(9), &mut complex()).unwrap(),
            Some(json!(9))
        );
        assert_eq!(
            dump_tri_u32(&Tri::Infinite, &mut complex()).unwrap(),
            Some(json!("Infinity"))
        );
        assert_eq!(
            dump_tri_u32(&Tri::Unset, &mut complex()).unwrap(),
            Some(Value::Null)
        );
    }

    #[test]
    fn test_default_dump_unset_and_infinite() {
        assert_eq!(
            dump_tri_u64(&Tri::Unset, &mut args()).unwrap(),
            Some(json!({"set": false, "infinite": false, "number": 0}))
        );
        assert_eq!(
            dump_tri_u64(&Tri::Infinite, &mut args()).unwrap(),
            Some(json!({"set": false, "infinite": true, "number": 0}))
        );
    }

    #[test]
    fn test_u16_overflow_rejected() {
        let mut dst = TriU16::Unset;
        let err = parse_tri_u16(&mut dst, &json!(100_000), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "INVALID_VALUE");
    }

    #[test]
    fn test_f64_sentinels() {
        let mut dst = TriF64::Unset;
        parse_tri_f64(&mut dst, &json!(NO_VAL as f64), &mut args()).unwrap();
        assert_eq!(dst, Tri::Unset);
        parse_tri_f64(&mut dst, &json!(2.5), &mut args()).unwrap();
        assert_eq!(dst, Tri::Set(2.5));
    }

    #[test]
    fn test_bool_tri() {
        let mut dst = TriBool::Unset;
        parse_tri_bool(&mut dst, &json!(true), &mut args()).unwrap();
        assert_eq!(dst, Tri::Set(true));
        assert_eq!(
            dump_tri_bool(&dst, &mut args()).unwrap(),
            Some(json!({"set": true, "infinite": false, "number": true}))
        );
    }

    #[test]
    fn test_tri_time_accepts_strings() {
        let mut dst = TriTime::Unset;
        parse_tri_time(&mut dst, &json!("1970-01-02"), &mut args()).unwrap();
        assert_eq!(dst, Tri::Set(86_400));
    }

    #[test]
    fn test_round_trip_both_modes() {
        for value in [Tri::Set(12u32), Tri::Infinite, Tri::Unset] {
            // Object form.
            let dumped = dump_tri_u32(&value, &mut args()).unwrap().unwrap();
            let mut back = TriU32::Unset;
            parse_tri_u32(&mut back, &dumped, &mut args()).unwrap();
            assert_eq!(back, value);
            // Scalar form.
            let dumped = dump_tri_u32(&value, &mut complex()).unwrap().unwrap();
            let mut back = TriU32::Unset;
            parse_tri_u32(&mut back, &dumped, &mut complex()).unwrap();
            assert_eq!(back, value);
        }
    }
}
