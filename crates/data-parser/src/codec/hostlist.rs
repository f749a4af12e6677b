//! Hostlist codec: compressed range string or array of names in;
//! expanded array of names out.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::model::Hostlist;
use crate::tree;
use serde_json::Value;

pub(crate) fn parse_hostlist(
    dst: &mut Hostlist,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            *dst = Hostlist::new();
            Ok(())
        }
        Value::String(s) => {
            *dst = Hostlist::from_ranged(s).map_err(ParseError::InvalidValue)?;
            Ok(())
        }
        Value::Array(items) => {
            let mut hl = Hostlist::new();
            for item in items {
                let name =
                    tree::coerce_string(item).ok_or_else(|| ParseError::conv("hostname", item))?;
                hl.push(name);
            }
            *dst = hl;
            Ok(())
        }
        _ => Err(ParseError::conv("hostlist", src)),
    }
}

pub(crate) fn dump_hostlist(
    src: &Hostlist,
    _args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(Value::Array(
        src.names()
            .iter()
            .map(|n| Value::String(n.clone()))
            .collect(),
    )))
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
    fn test_ranged_and_array_equivalent() {
        let mut from_range = Hostlist::new();
        parse_hostlist(&mut from_range, &json!("node[01-03]"), &mut args()).unwrap();
        let mut from_array = Hostlist::new();
        parse_hostlist(
            &mut from_array,
            &json!(["node01", "node02", "node03"]),
            &mut args(),
        )
        .unwrap();
        assert_eq!(from_range, from_array);
        assert_eq!(
            dump_hostlist(&from_range, &mut args()).unwrap(),
            Some(json!(["node01", "node02", "node03"]))
        );
    }

    #[test]
    fn test_bad_expression() {
        let mut hl = Hostlist::new();
        assert!(parse_hostlist(&mut hl, &json!("node[9-1]"), &mut args()).is_err());
        assert!(parse_hostlist(&mut hl, &json!(7), &mut args()).is_err());
    }
}
