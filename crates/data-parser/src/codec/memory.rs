//! Memory request codecs.
//!
//! One 64-bit native field backs two wire keys: the `MEM_PER_CPU` high
//! bit selects the per-CPU interpretation. Each key is a distinct
//! overloaded descriptor over the same field; the variant whose tag does
//! not match dumps nothing.

use crate::args::ParserArgs;
use crate::codec::noval::{dump_tri_u64, parse_tri_u64};
use crate::error::ParseError;
use crate::model::{Tri, TriU64, INFINITE64, MEM_PER_CPU, NO_VAL64};
use serde_json::Value;

fn is_sentinel(raw: u64) -> bool {
    raw == NO_VAL64 || raw == INFINITE64
}

fn tagged_per_cpu(raw: u64) -> bool {
    !is_sentinel(raw) && raw & MEM_PER_CPU != 0
}

fn payload(raw: u64) -> TriU64 {
    if raw == NO_VAL64 {
        Tri::Unset
    } else if raw == INFINITE64 {
        Tri::Infinite
    } else {
        Tri::Set(raw & !MEM_PER_CPU)
    }
}

fn parse_payload(src: &Value, args: &mut ParserArgs) -> Result<TriU64, ParseError> {
    let mut tri = TriU64::Unset;
    parse_tri_u64(&mut tri, src, args)?;
    if let Tri::Set(n) = tri {
        if n & MEM_PER_CPU != 0 {
            return Err(ParseError::InvalidTaskMemory(format!(
                "{n} MiB is not encodable"
            )));
        }
    }
    Ok(tri)
}

pub(crate) fn parse_mem_per_cpu(
    dst: &mut u64,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match parse_payload(src, args)? {
        Tri::Set(n) => n | MEM_PER_CPU,
        Tri::Infinite => INFINITE64,
        Tri::Unset => NO_VAL64,
    };
    Ok(())
}

pub(crate) fn parse_mem_per_node(
    dst: &mut u64,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    *dst = match parse_payload(src, args)? {
        Tri::Set(n) => n,
        Tri::Infinite => INFINITE64,
        Tri::Unset => NO_VAL64,
    };
    Ok(())
}

/// Emits only when the per-CPU tag is set; otherwise the key is omitted.
pub(crate) fn dump_mem_per_cpu(
    src: &u64,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    if !tagged_per_cpu(*src) {
        return Ok(None);
    }
    dump_tri_u64(&payload(*src), args)
}

/// Emits for untagged set values and the infinite state; unset and
/// per-CPU-tagged values omit the key.
pub(crate) fn dump_mem_per_node(
    src: &u64,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    let raw = *src;
    if raw == NO_VAL64 || tagged_per_cpu(raw) {
        return Ok(None);
    }
    dump_tri_u64(&payload(raw), args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::Resolvers;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args<'a>() -> ParserArgs<'a> {
        ParserArgs::parsing(Resolvers::default())
    }

    #[test]
    fn test_per_cpu_dump_and_omission() {
        let raw = MEM_PER_CPU | 4096;
        assert_eq!(
            dump_mem_per_cpu(&raw, &mut args()).unwrap(),
            Some(json!({"set": true, "infinite": false, "number": 4096}))
        );
        assert_eq!(dump_mem_per_node(&raw, &mut args()).unwrap(), None);
    }

    #[test]
    fn test_per_node_dump_and_omission() {
        let raw = 2048u64;
        assert_eq!(dump_mem_per_cpu(&raw, &mut args()).unwrap(), None);
        assert_eq!(
            dump_mem_per_node(&raw, &mut args()).unwrap(),
            Some(json!({"set": true, "infinite": false, "number": 2048}))
        );
    }

    #[test]
    fn test_unset_omits_both() {
        assert_eq!(dump_mem_per_cpu(&NO_VAL64, &mut args()).unwrap(), None);
        assert_eq!(dump_mem_per_node(&NO_VAL64, &mut args()).unwrap(), None);
    }

    #[test]
    fn test_parse_sets_tag_by_key() {
        let mut raw = NO_VAL64;
        parse_mem_per_cpu(&mut raw, &json!(4096), &mut args()).unwrap();
        assert_eq!(raw, MEM_PER_CPU | 4096);

        let mut raw = NO_VAL64;
        parse_mem_per_node(&mut raw, &json!(4096), &mut args()).unwrap();
        assert_eq!(raw, 4096);
    }

    #[test]
    fn test_round_trip_per_cpu() {
        let native = MEM_PER_CPU | 4096;
        let dumped = dump_mem_per_cpu(&native, &mut args()).unwrap().unwrap();
        let mut back = NO_VAL64;
        parse_mem_per_cpu(&mut back, &dumped, &mut args()).unwrap();
        assert_eq!(back, native);
    }

    #[test]
    fn test_unencodable_rejected() {
        let mut raw = NO_VAL64;
        let err = parse_mem_per_cpu(&mut raw, &json!(MEM_PER_CPU | 7), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "INVALID_TASK_MEMORY");
        assert_eq!(raw, NO_VAL64);
    }
}
