//! Signal number ↔ symbolic name.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::model::NO_VAL16;
use crate::tree;
use serde_json::Value;

/// Highest realtime signal recognized; numbers at or above this draw a
/// warning but are stored anyway.
pub(crate) const SIGRTMAX: u16 = 64;

const SIGNALS: &[(u16, &str)] = &[
    (1, "SIGHUP"),
    (2, "SIGINT"),
    (3, "SIGQUIT"),
    (4, "SIGILL"),
    (5, "SIGTRAP"),
    (6, "SIGABRT"),
    (7, "SIGBUS"),
    (8, "SIGFPE"),
    (9, "SIGKILL"),
    (10, "SIGUSR1"),
    (11, "SIGSEGV"),
    (12, "SIGUSR2"),
    (13, "SIGPIPE"),
    (14, "SIGALRM"),
    (15, "SIGTERM"),
    (17, "SIGCHLD"),
    (18, "SIGCONT"),
    (19, "SIGSTOP"),
    (20, "SIGTSTP"),
    (21, "SIGTTIN"),
    (22, "SIGTTOU"),
    (23, "SIGURG"),
    (24, "SIGXCPU"),
    (25, "SIGXFSZ"),
    (26, "SIGVTALRM"),
    (27, "SIGPROF"),
    (28, "SIGWINCH"),
    (29, "SIGPOLL"),
    (30, "SIGPWR"),
    (31, "SIGSYS"),
];

pub(crate) fn signal_name(number: u16) -> Option<&'static str> {
    SIGNALS
        .iter()
        .find(|(n, _)| *n == number)
        .map(|(_, name)| *name)
}

/// Accepts `TERM`, `SIGTERM`, `sigterm`, or a decimal string.
pub(crate) fn signal_number(name: &str) -> Option<u16> {
    let name = name.trim();
    if let Ok(n) = name.parse::<u16>() {
        return Some(n);
    }
    let bare = name.strip_prefix("SIG").or_else(|| name.strip_prefix("sig")).unwrap_or(name);
    SIGNALS
        .iter()
        .find(|(_, n)| n[3..].eq_ignore_ascii_case(bare))
        .map(|(n, _)| *n)
}

pub(crate) fn parse_signal(
    dst: &mut u16,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    let number = match src {
        Value::Null => {
            *dst = 0;
            return Ok(());
        }
        Value::Number(_) => {
            let wide = tree::coerce_u64(src).ok_or_else(|| ParseError::conv("signal", src))?;
            u16::try_from(wide)
                .map_err(|_| ParseError::InvalidValue(format!("{wide} exceeds signal range")))?
        }
        Value::String(s) if s.trim().is_empty() => {
            *dst = 0;
            return Ok(());
        }
        Value::String(s) => signal_number(s)
            .ok_or_else(|| ParseError::InvalidValue(format!("unknown signal name {s:?}")))?,
        _ => return Err(ParseError::conv("signal", src)),
    };
    if number == 0 || number >= SIGRTMAX {
        args.warn(format!("Non-standard signal number: {number}"));
    }
    *dst = number;
    Ok(())
}

pub(crate) fn dump_signal(src: &u16, args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    let number = *src;
    if number == 0 || number == NO_VAL16 {
        return Ok(Some(if args.is_complex() {
            Value::Null
        } else {
            Value::String(String::new())
        }));
    }
    Ok(Some(match signal_name(number) {
        Some(name) => Value::String(name.to_string()),
        None => Value::String(number.to_string()),
    }))
}
