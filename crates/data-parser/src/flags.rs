//! Flag-array engine.
//!
//! Translates between an integer bitfield and an array of named flags
//! (or a single string for `single_flag` descriptors) using the
//! declarative bit/mask/equal tables carried by the descriptor.

use crate::args::ParserArgs;
use crate::descriptor::{FlagBit, FlagKind, Model};
use crate::error::ParseError;
use crate::registry;
use crate::tree;
use crate::TypeId;
use serde_json::Value;

fn table_of(type_id: TypeId) -> Result<(&'static [FlagBit], bool), ParseError> {
    match registry::find(type_id)?.model {
        Model::FlagArray {
            bits, single_flag, ..
        } => Ok((bits, single_flag)),
        _ => Err(ParseError::UnknownType("flag array expected")),
    }
}

pub(crate) fn parse_flags(
    type_id: TypeId,
    bits: &mut u64,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    let (table, _single) = table_of(type_id)?;
    let tokens: Vec<String> = match src {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(
                    tree::coerce_string(item)
                        .ok_or_else(|| ParseError::conv("flag token", item))?,
                );
            }
            out
        }
        _ => {
            return Err(ParseError::ExpectedList {
                found: tree::type_name(src),
            })
        }
    };
    for token in tokens {
        // Hidden entries still match on parse.
        match table.iter().find(|e| e.name.eq_ignore_ascii_case(&token)) {
            Some(entry) => match entry.kind {
                FlagKind::Equal => *bits = (*bits & !entry.mask) | entry.value,
                FlagKind::Bit => *bits |= entry.value,
            },
            None => args.warn(format!("Unknown flag {token:?} ignored")),
        }
    }
    Ok(())
}

pub(crate) fn dump_flags(
    type_id: TypeId,
    bits: u64,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    let (table, single) = table_of(type_id)?;
    let mut out: Vec<Value> = Vec::new();
    let mut equal_emitted = false;
    // Self-check guarantees EQUAL entries precede BIT entries, so the
    // output order is the declaration order.
    for entry in table.iter().filter(|e| !e.hidden) {
        match entry.kind {
            FlagKind::Equal => {
                if !equal_emitted && bits & entry.mask == entry.value {
                    out.push(Value::String(entry.name.to_string()));
                    equal_emitted = true;
                }
            }
            FlagKind::Bit => {
                if entry.value != 0 && (bits & entry.mask) & entry.value == entry.value {
                    out.push(Value::String(entry.name.to_string()));
                }
            }
        }
    }
    if single {
        return Ok(Some(out.into_iter().next().unwrap_or(Value::Null)));
    }
    Ok(Some(Value::Array(out)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::*;
    use crate::resolvers::Resolvers;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args<'a>() -> ParserArgs<'a> {
        ParserArgs::parsing(Resolvers::default())
    }

    #[test]
    fn test_equal_then_bits_in_declaration_order() {
        let bits = (NODE_STATE_MIXED | NODE_STATE_DRAIN | NODE_STATE_NET) as u64;
        assert_eq!(
            dump_flags(TypeId::NodeStates, bits, &mut args()).unwrap(),
            Some(json!(["MIXED", "DRAIN", "PERFCTRS"]))
        );
    }

    #[test]
    fn test_parse_tokens() {
        let mut bits = 0u64;
        parse_flags(
            TypeId::NodeStates,
            &mut bits,
            &json!(["MIXED", "DRAIN", "PERFCTRS"]),
            &mut args(),
        )
        .unwrap();
        assert_eq!(
            bits,
            (NODE_STATE_MIXED | NODE_STATE_DRAIN | NODE_STATE_NET) as u64
        );
    }

    #[test]
    fn test_unknown_token_warns() {
        let mut bits = 0u64;
        let mut a = args();
        parse_flags(TypeId::NodeStates, &mut bits, &json!(["NOPE", "DRAIN"]), &mut a).unwrap();
        assert_eq!(bits, NODE_STATE_DRAIN as u64);
        assert_eq!(a.warnings().len(), 1);
        assert!(a.warnings()[0].description.contains("Unknown flag"));
    }

    #[test]
    fn test_equal_overwrites_under_mask() {
        let mut bits = NODE_STATE_IDLE as u64;
        parse_flags(TypeId::NodeStates, &mut bits, &json!(["ALLOCATED"]), &mut args()).unwrap();
        assert_eq!(bits & NODE_STATE_BASE as u64, NODE_STATE_ALLOCATED as u64);
    }

    #[test]
    fn test_hidden_accepted_on_parse_not_dumped() {
        let mut bits = 0u64;
        parse_flags(TypeId::NodeStates, &mut bits, &json!(["CLOUD"]), &mut args()).unwrap();
        assert_eq!(bits, NODE_STATE_CLOUD as u64);
        // Base state UNKNOWN (0) matches the first EQUAL; CLOUD itself
        // never appears.
        let dumped = dump_flags(TypeId::NodeStates, bits, &mut args())
            .unwrap()
            .unwrap();
        assert!(!dumped.as_array().unwrap().contains(&json!("CLOUD")));
    }

    #[test]
    fn test_single_flag_string() {
        let mut bits = 0u64;
        parse_flags(TypeId::JobShared, &mut bits, &json!("user"), &mut args()).unwrap();
        assert_eq!(
            dump_flags(TypeId::JobShared, bits, &mut args()).unwrap(),
            Some(json!("user"))
        );
    }

    #[test]
    fn test_structural_error() {
        let mut bits = 0u64;
        let err = parse_flags(TypeId::NodeStates, &mut bits, &json!(7), &mut args()).unwrap_err();
        assert_eq!(err.wire_name(), "DATA_EXPECTED_LIST");
    }

    #[test]
    fn test_mask_preservation_round_trip() {
        let bits = (NODE_STATE_DOWN | NODE_STATE_MAINT | NODE_STATE_FAIL) as u64;
        let dumped = dump_flags(TypeId::NodeStates, bits, &mut args())
            .unwrap()
            .unwrap();
        let mut back = 0u64;
        parse_flags(TypeId::NodeStates, &mut back, &dumped, &mut args()).unwrap();
        assert_eq!(back, bits);
    }
}
