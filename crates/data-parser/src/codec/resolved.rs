//! Codecs that consult ambient resolver tables: QoS ids, association
//! ids, user/group ids, and TRES strings.

use crate::args::ParserArgs;
use crate::dispatch;
use crate::error::ParseError;
use crate::model::{AssocShort, JobInfo};
use crate::tree;
use crate::TypeId;
use serde_json::{json, Value};

/// Rendering for an unresolvable id: the literal "Unknown" in default
/// mode, null when the caller opted into complex values.
fn unknown_value(args: &ParserArgs) -> Value {
    if args.is_complex() {
        Value::Null
    } else {
        Value::String("Unknown".into())
    }
}

// ---------------------------------------------------------------------
// QoS id
// ---------------------------------------------------------------------

pub(crate) fn parse_qos_id(
    dst: &mut u32,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            *dst = 0;
            Ok(())
        }
        Value::Number(_) => {
            let id = tree::coerce_u64(src)
                .filter(|v| *v <= u32::MAX as u64)
                .ok_or_else(|| ParseError::conv("QOS id", src))? as u32;
            if args.resolvers.qos.is_some() && args.resolvers.qos_by_id(id).is_none() {
                return Err(ParseError::InvalidQos(id.to_string()));
            }
            *dst = id;
            Ok(())
        }
        Value::String(name) => {
            if args.resolvers.qos.is_none() {
                return Err(ParseError::NotSupported("QOS resolver not loaded"));
            }
            match args.resolvers.qos_by_name(name) {
                Some(qos) => {
                    *dst = qos.id;
                    Ok(())
                }
                None => Err(ParseError::InvalidQos(name.clone())),
            }
        }
        _ => Err(ParseError::conv("QOS", src)),
    }
}

pub(crate) fn dump_qos_id(src: &u32, args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    let id = *src;
    if id == 0 {
        return Ok(Some(Value::Null));
    }
    match args.resolvers.qos_by_id(id) {
        Some(qos) => Ok(Some(match &qos.name {
            Some(name) => Value::String(name.clone()),
            None => json!(id),
        })),
        None => {
            args.warn(format!("Unable to resolve QOS id {id}"));
            Ok(Some(unknown_value(args)))
        }
    }
}

// ---------------------------------------------------------------------
// Association id
// ---------------------------------------------------------------------

pub(crate) fn parse_assoc_id(
    dst: &mut u32,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            *dst = 0;
            Ok(())
        }
        Value::Number(_) => {
            let id = tree::coerce_u64(src)
                .filter(|v| *v <= u32::MAX as u64)
                .ok_or_else(|| ParseError::conv("association id", src))? as u32;
            *dst = id;
            Ok(())
        }
        Value::Object(_) => {
            let mut key = AssocShort::default();
            dispatch::parse_into(TypeId::AssocShort, &mut key, src, args)?;
            match args.resolvers.assoc_find(&key) {
                Some(assoc) => {
                    *dst = assoc.id;
                    Ok(())
                }
                None => Err(ParseError::InvalidAssoc(format!(
                    "{}/{}/{}/{}",
                    key.cluster.as_deref().unwrap_or("*"),
                    key.account.as_deref().unwrap_or("*"),
                    key.user.as_deref().unwrap_or("*"),
                    key.partition.as_deref().unwrap_or("*"),
                ))),
            }
        }
        _ => Err(ParseError::conv("association", src)),
    }
}

pub(crate) fn dump_assoc_id(src: &u32, args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    let id = *src;
    if id == 0 {
        return Ok(Some(Value::Null));
    }
    let found = args
        .resolvers
        .assocs
        .and_then(|list| list.iter().find(|a| a.id == id));
    match found {
        Some(assoc) => {
            let short = AssocShort {
                cluster: assoc.cluster.clone(),
                account: assoc.account.clone(),
                user: assoc.user.clone(),
                partition: assoc.partition.clone(),
                id: assoc.id,
            };
            dispatch::dump_from(TypeId::AssocShort, &short, args)
        }
        None => {
            args.warn(format!("Unable to resolve association id {id}"));
            Ok(Some(unknown_value(args)))
        }
    }
}

// ---------------------------------------------------------------------
// User / group ids
// ---------------------------------------------------------------------

pub(crate) fn parse_user_id(
    dst: &mut u32,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            *dst = 0;
            Ok(())
        }
        Value::Number(_) => {
            *dst = tree::coerce_u64(src)
                .filter(|v| *v <= u32::MAX as u64)
                .ok_or_else(|| ParseError::conv("user id", src))? as u32;
            Ok(())
        }
        Value::String(name) => {
            let users = args
                .resolvers
                .users
                .ok_or(ParseError::NotSupported("user resolver not loaded"))?;
            *dst = users
                .uid_for_name(name)
                .ok_or_else(|| ParseError::UserIdUnknown(name.clone()))?;
            Ok(())
        }
        _ => Err(ParseError::conv("user", src)),
    }
}

/// Falls back to the numeric id rendered as a string when the name is
/// unknown.
pub(crate) fn dump_user_id(src: &u32, args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    let uid = *src;
    match args.resolvers.users.and_then(|u| u.name_for_uid(uid)) {
        Some(name) => Ok(Some(Value::String(name))),
        None => {
            args.warn(format!("Unable to resolve user id {uid}"));
            Ok(Some(Value::String(uid.to_string())))
        }
    }
}

pub(crate) fn parse_group_id(
    dst: &mut u32,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    match src {
        Value::Null => {
            *dst = 0;
            Ok(())
        }
        Value::Number(_) => {
            *dst = tree::coerce_u64(src)
                .filter(|v| *v <= u32::MAX as u64)
                .ok_or_else(|| ParseError::conv("group id", src))? as u32;
            Ok(())
        }
        Value::String(name) => {
            let users = args
                .resolvers
                .users
                .ok_or(ParseError::NotSupported("group resolver not loaded"))?;
            *dst = users
                .gid_for_name(name)
                .ok_or_else(|| ParseError::GroupIdUnknown(name.clone()))?;
            Ok(())
        }
        _ => Err(ParseError::conv("group", src)),
    }
}

pub(crate) fn dump_group_id(src: &u32, args: &mut ParserArgs) -> Result<Option<Value>, ParseError> {
    let gid = *src;
    match args.resolvers.users.and_then(|u| u.name_for_gid(gid)) {
        Some(name) => Ok(Some(Value::String(name))),
        None => {
            args.warn(format!("Unable to resolve group id {gid}"));
            Ok(Some(Value::String(gid.to_string())))
        }
    }
}

// ---------------------------------------------------------------------
// TRES strings: canonical form is comma-joined `id=count` pairs
// ---------------------------------------------------------------------

/// Split one canonical pair; malformed pairs yield None.
fn split_pair(pair: &str) -> Option<(u32, u64)> {
    let (id, count) = pair.split_once('=')?;
    Some((id.trim().parse().ok()?, count.trim().parse().ok()?))
}

fn resolve_spec(spec: &str, args: &ParserArgs) -> Result<(u32, u64), ParseError> {
    let (lhs, count) = spec
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidTres(spec.to_string()))?;
    let count: u64 = count
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidTres(spec.to_string()))?;
    let lhs = lhs.trim();
    if let Ok(id) = lhs.parse::<u32>() {
        if args.resolvers.tres_by_id(id).is_none() {
            return Err(ParseError::InvalidTres(lhs.to_string()));
        }
        return Ok((id, count));
    }
    let (r#type, name) = match lhs.split_once('/') {
        Some((t, n)) => (t, Some(n)),
        None => (lhs, None),
    };
    match args.resolvers.tres_by_type_name(r#type, name) {
        Some(tres) => Ok((tres.id, count)),
        None => Err(ParseError::InvalidTres(lhs.to_string())),
    }
}

pub(crate) fn parse_tres_string(
    dst: &mut Option<String>,
    src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    if src.is_null() {
        *dst = None;
        return Ok(());
    }
    if args.resolvers.tres.is_none() {
        return Err(ParseError::NotSupported("TRES resolver not loaded"));
    }
    let mut pairs: Vec<(u32, u64)> = Vec::new();
    match src {
        Value::String(s) => {
            for spec in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                pairs.push(resolve_spec(spec, args)?);
            }
        }
        Value::Array(items) => {
            for item in items {
                let dict = tree::as_dict(item).ok_or_else(|| {
                    ParseError::ExpectedDict {
                        found: tree::type_name(item),
                    }
                })?;
                let count = dict
                    .get("count")
                    .and_then(tree::coerce_u64)
                    .ok_or_else(|| ParseError::InvalidTres("entry without count".into()))?;
                if let Some(id) = dict.get("id").and_then(tree::coerce_u64) {
                    let id = id as u32;
                    if args.resolvers.tres_by_id(id).is_none() {
                        return Err(ParseError::InvalidTres(id.to_string()));
                    }
                    pairs.push((id, count));
                    continue;
                }
                let r#type = dict
                    .get("type")
                    .and_then(tree::coerce_string)
                    .ok_or_else(|| ParseError::InvalidTres("entry without type".into()))?;
                let name = dict.get("name").and_then(tree::coerce_string);
                match args.resolvers.tres_by_type_name(&r#type, name.as_deref()) {
                    Some(tres) => pairs.push((tres.id, count)),
                    None => return Err(ParseError::InvalidTres(r#type)),
                }
            }
        }
        _ => return Err(ParseError::conv("TRES", src)),
    }
    *dst = if pairs.is_empty() {
        None
    } else {
        Some(
            pairs
                .iter()
                .map(|(id, count)| format!("{id}={count}"))
                .collect::<Vec<_>>()
                .join(","),
        )
    };
    Ok(())
}

/// Decompose one canonical string into an array of TRES objects.
fn decompose_tres(canonical: &str, args: &mut ParserArgs) -> Vec<Value> {
    let mut out = Vec::new();
    for pair in canonical.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((id, count)) = split_pair(pair) else {
            args.warn(format!("Malformed TRES pair {pair:?} skipped"));
            continue;
        };
        match args.resolvers.tres_by_id(id) {
            Some(tres) => out.push(json!({
                "type": tres.r#type.clone(),
                "name": tres.name.clone(),
                "count": count,
                "id": id,
            })),
            None => {
                args.warn(format!("Unable to resolve TRES id {id}"));
                out.push(json!({
                    "type": unknown_value(args),
                    "name": Value::Null,
                    "count": count,
                    "id": id,
                }));
            }
        }
    }
    out
}

pub(crate) fn dump_tres_string(
    src: &Option<String>,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    Ok(Some(match src {
        None => Value::Array(Vec::new()),
        Some(canonical) => Value::Array(decompose_tres(canonical, args)),
    }))
}

// ---------------------------------------------------------------------
// Per-node TRES projection (dump-only)
// ---------------------------------------------------------------------

/// Joins per-node TRES strings with node names from the job's hostlist.
pub(crate) fn dump_tres_nct(
    src: &JobInfo,
    args: &mut ParserArgs,
) -> Result<Option<Value>, ParseError> {
    if src.tres_per_node.is_empty() {
        return Ok(Some(Value::Array(Vec::new())));
    }
    let mut out = Vec::with_capacity(src.tres_per_node.len());
    for (index, canonical) in src.tres_per_node.iter().enumerate() {
        let node = match src.nodes.get(index) {
            Some(name) => Value::String(name.to_string()),
            None => {
                args.warn(format!("No hostname for node index {index}"));
                Value::Null
            }
        };
        out.push(json!({
            "node": node,
            "tres": decompose_tres(canonical, args),
        }));
    }
    Ok(Some(Value::Array(out)))
}

/// Disabled direction of the per-node projection.
pub(crate) fn parse_tres_nct(
    _dst: &mut JobInfo,
    _src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    args.warn("per-node TRES is not supported by this version for parsing");
    Ok(())
}

/// Disabled parse direction of the whole job record.
pub(crate) fn parse_job_info(
    _dst: &mut JobInfo,
    _src: &Value,
    args: &mut ParserArgs,
) -> Result<(), ParseError> {
    args.warn("job records are not supported by this version for parsing");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Hostlist, Qos, Tres, Tri};
    use crate::resolvers::Resolvers;
    use pretty_assertions::assert_eq;

    fn qos_list() -> Vec<Qos> {
        vec![
            Qos {
                id: 1,
                name: Some("normal".into()),
                ..Default::default()
            },
            Qos {
                id: 5,
                name: Some("high".into()),
                ..Default::default()
            },
        ]
    }

    fn tres_list() -> Vec<Tres> {
        vec![
            Tres {
                id: 1,
                r#type: Some("cpu".into()),
                name: None,
                count: Tri::Unset,
            },
            Tres {
                id: 2,
                r#type: Some("mem".into()),
                name: None,
                count: Tri::Unset,
            },
            Tres {
                id: 1001,
                r#type: Some("gres".into()),
                name: Some("gpu".into()),
                count: Tri::Unset,
            },
        ]
    }

    #[test]
    fn test_qos_parse_by_name_and_id() {
        let qos = qos_list();
        let mut args = ParserArgs::parsing(Resolvers {
            qos: Some(&qos),
            ..Default::default()
        });
        let mut dst = 0u32;
        parse_qos_id(&mut dst, &json!("high"), &mut args).unwrap();
        assert_eq!(dst, 5);
        parse_qos_id(&mut dst, &json!(1), &mut args).unwrap();
        assert_eq!(dst, 1);
        let err = parse_qos_id(&mut dst, &json!("absent"), &mut args).unwrap_err();
        assert_eq!(err.wire_name(), "INVALID_QOS");
    }

    #[test]
    fn test_qos_dump_resolves_and_degrades() {
        let qos = qos_list();
        let mut args = ParserArgs::dumping(Resolvers {
            qos: Some(&qos),
            ..Default::default()
        });
        assert_eq!(dump_qos_id(&5, &mut args).unwrap(), Some(json!("high")));
        assert_eq!(dump_qos_id(&99, &mut args).unwrap(), Some(json!("Unknown")));
        assert_eq!(args.warnings().len(), 1);

        use crate::args::Behavior;
        let mut complex = ParserArgs::dumping(Resolvers {
            qos: Some(&qos),
            ..Default::default()
        })
        .with_behavior(Behavior::COMPLEX_VALUES);
        assert_eq!(dump_qos_id(&99, &mut complex).unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_tres_parse_forms() {
        let tres = tres_list();
        let mut args = ParserArgs::parsing(Resolvers {
            tres: Some(&tres),
            ..Default::default()
        });
        let mut dst = None;
        parse_tres_string(&mut dst, &json!("cpu=4,gres/gpu=2"), &mut args).unwrap();
        assert_eq!(dst.as_deref(), Some("1=4,1001=2"));

        parse_tres_string(
            &mut dst,
            &json!([{"type": "mem", "count": 2048}]),
            &mut args,
        )
        .unwrap();
        assert_eq!(dst.as_deref(), Some("2=2048"));

        let err = parse_tres_string(&mut dst, &json!("disk=1"), &mut args).unwrap_err();
        assert_eq!(err.wire_name(), "INVALID_TRES");
    }

    #[test]
    fn test_tres_dump_decomposes() {
        let tres = tres_list();
        let mut args = ParserArgs::dumping(Resolvers {
            tres: Some(&tres),
            ..Default::default()
        });
        let dumped = dump_tres_string(&Some("1=4,1001=2".into()), &mut args)
            .unwrap()
            .unwrap();
        assert_eq!(
            dumped,
            json!([
                {"type": "cpu", "name": null, "count": 4, "id": 1},
                {"type": "gres", "name": "gpu", "count": 2, "id": 1001},
            ])
        );
    }

    #[test]
    fn test_tres_nct_projection() {
        let tres = tres_list();
        let mut args = ParserArgs::dumping(Resolvers {
            tres: Some(&tres),
            ..Default::default()
        });
        let job = JobInfo {
            nodes: Hostlist::from_ranged("node[01-02]").unwrap(),
            tres_per_node: vec!["1=4".into(), "1=8".into()],
            ..Default::default()
        };
        let dumped = dump_tres_nct(&job, &mut args).unwrap().unwrap();
        assert_eq!(dumped[0]["node"], json!("node01"));
        assert_eq!(dumped[1]["tres"][0]["count"], json!(8));
    }

    #[test]
    fn test_user_group_ids() {
        use crate::resolvers::StaticUserTable;
        let table = StaticUserTable {
            users: vec![("alice".into(), 1000)],
            groups: vec![("physics".into(), 200)],
        };
        let mut args = ParserArgs::parsing(Resolvers {
            users: Some(&table),
            ..Default::default()
        });
        let mut uid = 0u32;
        parse_user_id(&mut uid, &json!("alice"), &mut args).unwrap();
        assert_eq!(uid, 1000);
        let err = parse_user_id(&mut uid, &json!("nobody"), &mut args).unwrap_err();
        assert_eq!(err.wire_name(), "USER_ID_UNKNOWN");

        let mut gid = 0u32;
        parse_group_id(&mut gid, &json!("physics"), &mut args).unwrap();
        assert_eq!(gid, 200);

        assert_eq!(dump_user_id(&1000, &mut args).unwrap(), Some(json!("alice")));
        // Unknown uid degrades to the numeric string.
        assert_eq!(dump_user_id(&4242, &mut args).unwrap(), Some(json!("4242")));
    }
}
