//! Timestamp parsing: integer seconds, absolute date strings, and
//! relative `now+...` offsets.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::tree;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};

/// Interpret a human-readable time string as seconds since the epoch.
pub(crate) fn parse_time_string(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    if let Some(rest) = s.strip_prefix("now") {
        let now = Utc::now().timestamp();
        let rest = rest.trim();
        if rest.is_empty() {
            return Some(now);
        }
        let (sign, body) = match rest.as_bytes()[0] {
            b'+' => (1i64, &rest[1..]),
            b'-' => (-1i64, &rest[1..]),
            _ => return None,
        };
        let digits: String = body.chars().take_while(|c| c.is_ascii_digit()).collect();
        let unit = body[digits.len()..].trim().to_ascii_lowercase();
        let count: i64 = digits.parse().ok()?;
        let scale = match unit.trim_end_matches('s') {
            "" | "second" => 1,
            "minute" | "min" => 60,
            "hour" => 3600,
            "day" => 86_400,
            "week" => 604_800,
            _ => return None,
        };
        return Some(now + sign * count * scale);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
    }
    None
}

pub(crate) fn parse_timestamp(
    dst: &mut i64,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            *dst = 0;
            Ok(())
        }
        Value::Number(_) => {
            *dst = tree::coerce_i64(src).ok_or_else(|| ParseError::conv("timestamp", src))?;
            Ok(())
        }
        Value::String(s) => {
            *dst = parse_time_string(s)
                .ok_or_else(|| ParseError::InvalidValue(format!("unrecognized time {s:?}")))?;
            Ok(())
        }
        _ => Err(ParseError::conv("timestamp", src)),
    }
}

pub(crate) fn dump_timestamp(
    src: &i64,
    _args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(json!(*src)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::Resolvers;

    fn args<'a>() -> ParserArgs<'a> {
        ParserArgs::parsing(Resolvers::default())
    }

    #[test]
    fn test_integer_passthrough() {
        let mut dst = 0i64;
        parse_timestamp(&mut dst, &json!(1_700_000_000), &mut args()).unwrap();
        assert_eq!(dst, 1_700_000_000);
    }

    #[test]
    fn test_absolute_forms() {
        assert_eq!(
            parse_time_string("1970-01-02T00:00:00"),
            Some(86_400)
        );
        assert_eq!(parse_time_string("1970-01-02"), Some(86_400));
        assert_eq!(
            parse_time_string("1970-01-01 01:00:00"),
            Some(3600)
        );
    }

    #[test]
    fn test_relative_offsets() {
        let now = Utc::now().timestamp();
        let plus = parse_time_string("now+1hour").unwrap();
        assert!((plus - now - 3600).abs() < 5);
        let minus = parse_time_string("now-30minutes").unwrap();
        assert!((minus - now + 1800).abs() < 5);
        let bare = parse_time_string("now").unwrap();
        assert!((bare - now).abs() < 5);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_time_string("whenever"), None);
        assert_eq!(parse_time_string("now*2"), None);
        let mut dst = 0i64;
        assert!(parse_timestamp(&mut dst, &json!("whenever"), &mut args()).is_err());
    }

    #[test]
    fn test_null_clears() {
        let mut dst = 55i64;
        parse_timestamp(&mut dst, &Value::Null, &mut args()).unwrap();
        assert_eq!(dst, 0);
    }
}
