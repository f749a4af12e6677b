//! POSIX wait-status decoding.
//!
//! The raw status word is dumped as a tagged object; parse accepts the
//! object or a bare integer carrying the raw word.

use crate::args::ParserArgs;
use crate::codec::signal::signal_name;
use crate::error::ParseError;
use crate::model::NO_VAL;
use crate::tree;
use serde_json::{json, Map, Value};

const STATUS_INVALID: &str = "INVALID";
const STATUS_PENDING: &str = "PENDING";
const STATUS_SUCCESS: &str = "SUCCESS";
const STATUS_ERROR: &str = "ERROR";
const STATUS_SIGNALED: &str = "SIGNALED";
const STATUS_CORE_DUMPED: &str = "CORE_DUMPED";

fn exited(status: u32) -> bool {
    status & 0x7f == 0
}

fn exit_code(status: u32) -> u32 {
    (status >> 8) & 0xff
}

fn term_signal(status: u32) -> u32 {
    status & 0x7f
}

fn stopped(status: u32) -> bool {
    status & 0xff == 0x7f
}

fn core_dumped(status: u32) -> bool {
    status & 0x80 != 0
}

pub(crate) fn dump_exit_code(
    src: &u32,
    _args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    let raw = *src;
    let mut return_code = Value::Null;
    let mut signal = Value::Null;
    let status = if raw == NO_VAL {
        STATUS_PENDING
    } else if stopped(raw) {
        STATUS_INVALID
    } else if exited(raw) {
        let code = exit_code(raw);
        return_code = json!(code);
        if code == 0 {
            STATUS_SUCCESS
        } else {
            STATUS_ERROR
        }
    } else {
        let sig = term_signal(raw) as u16;
        signal = json!({
            "id": sig,
            "name": signal_name(sig).unwrap_or(""),
        });
        if core_dumped(raw) {
            STATUS_CORE_DUMPED
        } else {
            STATUS_SIGNALED
        }
    };
    Ok(Some(json!({
        "status": status,
        "return_code": return_code,
        "signal": signal,
    })))
}

pub(crate) fn parse_exit_code(
    dst: &mut u32,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            *dst = NO_VAL;
            Ok(())
        }
        Value::Number(_) => {
            // Bare integer: the raw wait status word.
            *dst = tree::coerce_u64(src)
                .filter(|v| *v <= u32::MAX as u64)
                .ok_or_else(|| ParseError::conv("exit code", src))? as u32;
            Ok(())
        }
        Value::Object(map) => {
            *dst = reassemble(map)?;
            Ok(())
        }
        _ => Err(ParseError::conv("exit code", src)),
    }
}

fn reassemble(map: &Map<String, Value>) -> Result<u32, ParseError> {
    let status = map
        .get("status")
        .and_then(tree::coerce_string)
        .unwrap_or_else(|| STATUS_PENDING.to_string());
    match status.as_str() {
        STATUS_PENDING | STATUS_INVALID => Ok(NO_VAL),
        STATUS_SUCCESS => Ok(0),
        STATUS_ERROR => {
            let code = map
                .get("return_code")
                .and_then(tree::coerce_u64)
                .ok_or_else(|| ParseError::InvalidValue("ERROR status without return_code".into()))?;
            Ok(((code & 0xff) << 8) as u32)
        }
        STATUS_SIGNALED | STATUS_CORE_DUMPED => {
            let sig = match map.get("signal") {
                Some(Value::Object(s)) => s
                    .get("id")
                    .and_then(tree::coerce_u64)
                    .or_else(|| {
                        s.get("name")
                            .and_then(tree::coerce_string)
                            .and_then(|n| crate::codec::signal::signal_number(&n).map(u64::from))
                    }),
                Some(Value::Number(_)) => map.get("signal").and_then(tree::coerce_u64),
                Some(Value::String(s)) => {
                    crate::codec::signal::signal_number(s).map(u64::from)
                }
                _ => None,
            }
            .ok_or_else(|| ParseError::InvalidValue("SIGNALED status without signal".into()))?;
            let core = if status == STATUS_CORE_DUMPED { 0x80 } else { 0 };
            Ok((sig as u32 & 0x7f) | core)
        }
        other => Err(ParseError::InvalidValue(format!(
            "unknown exit status {other:?}"
        ))),
    }
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
    fn test_dump_exited_with_code() {
        // Wait status for "exited with 7".
        let raw = 7u32 << 8;
        assert_eq!(
            dump_exit_code(&raw, &mut args()).unwrap(),
            Some(json!({"status": "ERROR", "return_code": 7, "signal": null}))
        );
    }

    #[test]
    fn test_dump_success() {
        assert_eq!(
            dump_exit_code(&0, &mut args()).unwrap(),
            Some(json!({"status": "SUCCESS", "return_code": 0, "signal": null}))
        );
    }

    #[test]
    fn test_dump_signaled() {
        // SIGKILL, no core.
        assert_eq!(
            dump_exit_code(&9, &mut args()).unwrap(),
            Some(json!({
                "status": "SIGNALED",
                "return_code": null,
                "signal": {"id": 9, "name": "SIGKILL"},
            }))
        );
    }

    #[test]
    fn test_dump_core_dumped_and_pending() {
        let raw = 11 | 0x80;
        let dumped = dump_exit_code(&raw, &mut args()).unwrap().unwrap();
        assert_eq!(dumped["status"], json!("CORE_DUMPED"));
        assert_eq!(dumped["signal"]["name"], json!("SIGSEGV"));

        let pending = dump_exit_code(&NO_VAL, &mut args()).unwrap().unwrap();
        assert_eq!(pending["status"], json!("PENDING"));
    }

    #[test]
    fn test_parse_round_trip() {
        for raw in [0u32, 7 << 8, 9, 11 | 0x80, NO_VAL] {
            let dumped = dump_exit_code(&raw, &mut args()).unwrap().unwrap();
            let mut back = 0u32;
            parse_exit_code(&mut back, &dumped, &mut args()).unwrap();
            assert_eq!(back, raw, "round trip of {raw:#x}");
        }
    }

    #[test]
    fn test_parse_bare_integer() {
        let mut dst = 0u32;
        parse_exit_code(&mut dst, &json!(9), &mut args()).unwrap();
        assert_eq!(dst, 9);
    }

    #[test]
    fn test_parse_signal_by_name() {
        let mut dst = 0u32;
        parse_exit_code(
            &mut dst,
            &json!({"status": "SIGNALED", "signal": "SIGTERM"}),
            &mut args(),
        )
        .unwrap();
        assert_eq!(dst, 15);
    }
}
