//! Comma-delimited string lists.
//!
//! Parse accepts a comma-delimited string, a list of strings, or a dict
//! rendered as `k=v` pairs. Dumps are always an array of strings.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::tree;
use serde_json::Value;

pub(crate) fn parse_csv(
    dst: &mut Vec<String>,
    src: &Value,
    _args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            dst.clear();
            Ok(())
        }
        Value::String(s) => {
            *dst = s
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            Ok(())
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(
                    tree::coerce_string(item).ok_or_else(|| ParseError::conv("string", item))?,
                );
            }
            *dst = out;
            Ok(())
        }
        Value::Object(map) => {
            let mut out = Vec::with_capacity(map.len());
            for (k, v) in map {
                let v = tree::coerce_string(v).ok_or_else(|| ParseError::conv("string", v))?;
                out.push(format!("{k}={v}"));
            }
            *dst = out;
            Ok(())
        }
        _ => Err(ParseError::conv("string list", src)),
    }
}

pub(crate) fn dump_csv(
    src: &Vec<String>,
    _args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(Value::Array(
        src.iter().map(|s| Value::String(s.clone())).collect(),
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
    fn test_string_form() {
        let mut dst = Vec::new();
        parse_csv(&mut dst, &json!("a, b,c,"), &mut args()).unwrap();
        assert_eq!(dst, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_form() {
        let mut dst = Vec::new();
        parse_csv(&mut dst, &json!(["x", 2]), &mut args()).unwrap();
        assert_eq!(dst, vec!["x", "2"]);
    }

    #[test]
    fn test_dict_form() {
        let mut dst = Vec::new();
        parse_csv(&mut dst, &json!({"feature": "gpu", "count": 2}), &mut args()).unwrap();
        assert_eq!(dst, vec!["feature=gpu", "count=2"]);
    }

    #[test]
    fn test_dump_is_array() {
        let src = vec!["a".to_string(), "b".into()];
        assert_eq!(dump_csv(&src, &mut args()).unwrap(), Some(json!(["a", "b"])));
    }

    #[test]
    fn test_nested_rejected() {
        let mut dst = Vec::new();
        assert!(parse_csv(&mut dst, &json!([["nested"]]), &mut args()).is_err());
    }
}
