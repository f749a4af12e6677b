//! Ambient resource resolvers.
//!
//! Certain codecs stringify numeric ids (QoS, TRES, associations, uids)
//! or parse named references back to ids. The tables they consult are
//! owned by the caller, passed by reference for the duration of one
//! top-level call, and never mutated by the engine. A descriptor declares
//! which tables it requires through [`Needs`]; the top-level entry points
//! reject calls whose prerequisites are not loaded.

use crate::model::{AssocShort, Association, Qos, Tres};
use bitflags::bitflags;

bitflags! {
    /// Ambient-resource prerequisites of a descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Needs: u8 {
        const AUTH  = 0x01;
        const TRES  = 0x02;
        const QOS   = 0x04;
        const ASSOC = 0x08;
    }
}

/// Name ↔ uid/gid lookups. Behind a trait so tests and embedders can
/// supply a table without touching the system user database.
pub trait UserGroupLookup {
    fn uid_for_name(&self, name: &str) -> Option<u32>;
    fn name_for_uid(&self, uid: u32) -> Option<String>;
    fn gid_for_name(&self, name: &str) -> Option<u32>;
    fn name_for_gid(&self, gid: u32) -> Option<String>;
}

/// Static in-memory user/group table.
#[derive(Debug, Default)]
pub struct StaticUserTable {
    pub users: Vec<(String, u32)>,
    pub groups: Vec<(String, u32)>,
}

impl UserGroupLookup for StaticUserTable {
    fn uid_for_name(&self, name: &str) -> Option<u32> {
        self.users.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    fn name_for_uid(&self, uid: u32) -> Option<String> {
        self.users
            .iter()
            .find(|(_, id)| *id == uid)
            .map(|(n, _)| n.clone())
    }

    fn gid_for_name(&self, name: &str) -> Option<u32> {
        self.groups
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    fn name_for_gid(&self, gid: u32) -> Option<String> {
        self.groups
            .iter()
            .find(|(_, id)| *id == gid)
            .map(|(n, _)| n.clone())
    }
}

/// Read-only resolver handles carried by the ambient args.
#[derive(Default)]
pub struct Resolvers<'a> {
    pub qos: Option<&'a [Qos]>,
    pub tres: Option<&'a [Tres]>,
    pub assocs: Option<&'a [Association]>,
    pub users: Option<&'a dyn UserGroupLookup>,
}

impl<'a> Resolvers<'a> {
    pub fn satisfies(&self, needs: Needs) -> bool {
        (!needs.contains(Needs::QOS) || self.qos.is_some())
            && (!needs.contains(Needs::TRES) || self.tres.is_some())
            && (!needs.contains(Needs::ASSOC) || self.assocs.is_some())
            && (!needs.contains(Needs::AUTH) || self.users.is_some())
    }

    pub fn qos_by_id(&self, id: u32) -> Option<&'a Qos> {
        self.qos?.iter().find(|q| q.id == id)
    }

    pub fn qos_by_name(&self, name: &str) -> Option<&'a Qos> {
        self.qos?.iter().find(|q| q.name.as_deref() == Some(name))
    }

    pub fn tres_by_id(&self, id: u32) -> Option<&'a Tres> {
        self.tres?.iter().find(|t| t.id == id)
    }

    /// Match on class and (optional) sub-name, e.g. ("gres", Some("gpu")).
    pub fn tres_by_type_name(&self, r#type: &str, name: Option<&str>) -> Option<&'a Tres> {
        self.tres?
            .iter()
            .find(|t| t.r#type.as_deref() == Some(r#type) && t.name.as_deref() == name)
    }

    /// Fuzzy association match: fields present in `key` must match
    /// exactly; absent fields act as wildcards. First match wins.
    pub fn assoc_find(&self, key: &AssocShort) -> Option<&'a Association> {
        fn matches(want: &Option<String>, have: &Option<String>) -> bool {
            want.is_none() || want == have
        }
        self.assocs?.iter().find(|a| {
            matches(&key.cluster, &a.cluster)
                && matches(&key.account, &a.account)
                && matches(&key.user, &a.user)
                && matches(&key.partition, &a.partition)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tri;

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

    #[test]
    fn test_needs_satisfaction() {
        let qos = qos_list();
        let r = Resolvers {
            qos: Some(&qos),
            ..Default::default()
        };
        assert!(r.satisfies(Needs::QOS));
        assert!(r.satisfies(Needs::empty()));
        assert!(!r.satisfies(Needs::QOS | Needs::TRES));
    }

    #[test]
    fn test_qos_lookup() {
        let qos = qos_list();
        let r = Resolvers {
            qos: Some(&qos),
            ..Default::default()
        };
        assert_eq!(r.qos_by_name("high").map(|q| q.id), Some(5));
        assert_eq!(r.qos_by_id(1).and_then(|q| q.name.clone()), Some("normal".into()));
        assert!(r.qos_by_name("missing").is_none());
    }

    #[test]
    fn test_assoc_wildcard_match() {
        let assocs = vec![
            Association {
                id: 10,
                cluster: Some("main".into()),
                account: Some("physics".into()),
                user: Some("alice".into()),
                partition: None,
                ..Default::default()
            },
            Association {
                id: 11,
                cluster: Some("main".into()),
                account: Some("physics".into()),
                user: Some("bob".into()),
                partition: None,
                ..Default::default()
            },
        ];
        let r = Resolvers {
            assocs: Some(&assocs),
            ..Default::default()
        };
        let key = AssocShort {
            user: Some("bob".into()),
            ..Default::default()
        };
        assert_eq!(r.assoc_find(&key).map(|a| a.id), Some(11));

        let missing = AssocShort {
            user: Some("carol".into()),
            ..Default::default()
        };
        assert!(r.assoc_find(&missing).is_none());
    }

    #[test]
    fn test_static_user_table() {
        let table = StaticUserTable {
            users: vec![("root".into(), 0), ("alice".into(), 1000)],
            groups: vec![("wheel".into(), 10)],
        };
        assert_eq!(table.uid_for_name("alice"), Some(1000));
        assert_eq!(table.name_for_uid(0).as_deref(), Some("root"));
        assert_eq!(table.gid_for_name("wheel"), Some(10));
        assert_eq!(table.name_for_gid(99), None);
    }

    #[test]
    fn test_tres_tri_unused_width() {
        // Tres count defaults to unset.
        let t = Tres::default();
        assert_eq!(t.count, Tri::Unset);
    }
}
