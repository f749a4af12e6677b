//! Registry invariant scan.
//!
//! Violations are programming mistakes in the descriptor tables, not
//! runtime conditions: debug builds run this during registry assembly
//! and abort on any finding. The scan also exercises every vtable and
//! field accessor against a default-constructed instance, so a mismatch
//! between a table row and its native type fails at startup instead of
//! deep inside a request.

use crate::args::ParserArgs;
use crate::descriptor::{Descriptor, FieldAccessor, FieldKind, FlagKind, Model, OpenApiType};
use crate::error::ParseError;
use crate::resolvers::Resolvers;
use crate::TypeId;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

pub(crate) fn check_table(table: &HashMap<TypeId, Descriptor>) -> Vec<String> {
    let mut violations = Vec::new();
    for id in TypeId::ALL {
        if !table.contains_key(id) {
            violations.push(format!("{}: no descriptor registered", id.name()));
        }
    }
    for id in TypeId::ALL {
        if let Some(desc) = table.get(id) {
            check_descriptor(desc, table, &mut violations);
        }
    }
    violations
}

fn resolves(table: &HashMap<TypeId, Descriptor>, id: TypeId) -> bool {
    id != TypeId::Invalid && table.contains_key(&id)
}

fn check_descriptor(
    desc: &Descriptor,
    table: &HashMap<TypeId, Descriptor>,
    violations: &mut Vec<String>,
) {
    let name = desc.type_id.name();
    match desc.model {
        Model::Simple | Model::Complex => {
            if desc.openapi == OpenApiType::Invalid {
                violations.push(format!("{name}: leaf descriptor without an openapi base type"));
            }
        }
        Model::Composite { fields } => check_fields(name, fields, table, violations),
        Model::FlagArray { bits, width, .. } => check_flags(name, bits, width, violations),
        Model::List { element } | Model::NtArray { element } | Model::NtPtrArray { element } => {
            if !resolves(table, element) {
                violations.push(format!(
                    "{name}: element type {} is not registered",
                    element.name()
                ));
            }
        }
        Model::Ptr { target, .. } => {
            if !resolves(table, target) {
                violations.push(format!(
                    "{name}: target type {} is not registered",
                    target.name()
                ));
            }
        }
    }
    probe_vtable(desc, table, violations);
}

fn check_fields(
    name: &str,
    fields: &[crate::descriptor::LinkedField],
    table: &HashMap<TypeId, Descriptor>,
    violations: &mut Vec<String>,
) {
    let mut keys = HashSet::new();
    let mut native_groups: HashMap<&str, Vec<u8>> = HashMap::new();

    for field in fields {
        match field.kind {
            FieldKind::Linked { type_id } => {
                if field.key.is_empty() {
                    violations.push(format!("{name}: linked field with empty key"));
                }
                if !keys.insert(field.key) {
                    violations.push(format!("{name}: duplicate key {:?}", field.key));
                }
                if !resolves(table, type_id) {
                    violations.push(format!(
                        "{name}: field {:?} links to unregistered type {}",
                        field.key,
                        type_id.name()
                    ));
                    continue;
                }
                let child = &table[&type_id];
                match field.accessor {
                    FieldAccessor::Whole => {
                        // Whole-struct projections must themselves be
                        // struct-shaped parsers.
                        if !matches!(child.model, Model::Complex | Model::Composite { .. }) {
                            violations.push(format!(
                                "{name}: field {:?} projects the whole struct onto a {} parser",
                                field.key,
                                child.model.kind_name()
                            ));
                        }
                    }
                    FieldAccessor::Field { .. } => {
                        if matches!(child.model, Model::Complex) {
                            violations.push(format!(
                                "{name}: complex field {:?} must not carry a field accessor",
                                field.key
                            ));
                        }
                        if !field.native_name.is_empty() {
                            native_groups
                                .entry(field.native_name)
                                .or_default()
                                .push(field.overloads);
                        }
                    }
                    FieldAccessor::None => violations.push(format!(
                        "{name}: linked field {:?} has no accessor",
                        field.key
                    )),
                }
            }
            FieldKind::Removed { .. } => {
                if field.key.is_empty() {
                    violations.push(format!("{name}: removed field with empty key"));
                }
                if !keys.insert(field.key) {
                    violations.push(format!("{name}: duplicate key {:?}", field.key));
                }
                if !matches!(field.accessor, FieldAccessor::None) || !field.native_name.is_empty() {
                    violations.push(format!(
                        "{name}: removed field {:?} must carry no native storage",
                        field.key
                    ));
                }
                if field.required {
                    violations.push(format!(
                        "{name}: removed field {:?} cannot be required",
                        field.key
                    ));
                }
            }
            FieldKind::Skip => {
                if !field.key.is_empty() || !matches!(field.accessor, FieldAccessor::None) {
                    violations.push(format!(
                        "{name}: skip field {:?} carries more than an identifier",
                        field.native_name
                    ));
                }
            }
        }
    }

    // Declared overload counts must match the sibling group size.
    for (native_name, declared) in native_groups {
        let group_size = declared.len() as u8;
        for overloads in declared {
            if overloads != group_size {
                violations.push(format!(
                    "{name}: field over {native_name:?} declares {overloads} overloads, \
                     group has {group_size}"
                ));
            }
        }
    }
}

fn check_flags(
    name: &str,
    bits: &[crate::descriptor::FlagBit],
    width: u8,
    violations: &mut Vec<String>,
) {
    if bits.is_empty() {
        violations.push(format!("{name}: empty flag table"));
    }
    if !matches!(width, 16 | 32 | 64) {
        violations.push(format!("{name}: unsupported flag width {width}"));
    }
    let limit = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
    let mut names = HashSet::new();
    let mut seen_bit = false;
    for entry in bits {
        if entry.name.is_empty() {
            violations.push(format!("{name}: flag entry with empty name"));
        }
        if !names.insert(entry.name) {
            violations.push(format!("{name}: duplicate flag name {:?}", entry.name));
        }
        if entry.value > limit || entry.mask > limit {
            violations.push(format!(
                "{name}: flag {:?} does not fit in {width} bits",
                entry.name
            ));
        }
        match entry.kind {
            FlagKind::Equal => {
                if seen_bit {
                    violations.push(format!(
                        "{name}: EQUAL flag {:?} declared after a BIT flag",
                        entry.name
                    ));
                }
                if entry.value & !entry.mask != 0 {
                    violations.push(format!(
                        "{name}: EQUAL flag {:?} value escapes its mask",
                        entry.name
                    ));
                }
            }
            FlagKind::Bit => {
                seen_bit = true;
                if entry.value == 0 {
                    violations.push(format!("{name}: BIT flag {:?} has no bits", entry.name));
                }
                if entry.value & entry.mask != entry.value {
                    violations.push(format!(
                        "{name}: BIT flag {:?} value escapes its mask",
                        entry.name
                    ));
                }
            }
        }
    }
}

/// Exercise the vtable and field accessors against a default instance.
/// A `NativeMismatch` anywhere means a table row disagrees with its
/// native type.
fn probe_vtable(
    desc: &Descriptor,
    table: &HashMap<TypeId, Descriptor>,
    violations: &mut Vec<String>,
) {
    let name = desc.type_id.name();
    let native = (desc.vtable.new)();

    if let Model::Composite { fields } = desc.model {
        // Walk the field rows directly so the probe sees *this* table,
        // not whatever the process-wide registry holds for the id.
        for field in fields {
            let FieldKind::Linked { type_id } = field.kind else {
                continue;
            };
            let Some(child) = table.get(&type_id) else {
                continue;
            };
            let target: Option<&dyn std::any::Any> = match field.accessor {
                FieldAccessor::Whole => Some(native.as_ref()),
                FieldAccessor::Field { get, .. } => {
                    let got = get(native.as_ref());
                    if got.is_none() {
                        violations.push(format!(
                            "{name}: accessor for {:?} rejects its own struct",
                            field.key
                        ));
                    }
                    got
                }
                FieldAccessor::None => None,
            };
            if let Some(target) = target {
                let mut args = ParserArgs::dumping(Resolvers::default());
                if let Err(ParseError::NativeMismatch(_)) = (child.vtable.dump)(target, &mut args)
                {
                    violations.push(format!(
                        "{name}: field {:?} native type disagrees with {}",
                        field.key,
                        type_id.name()
                    ));
                }
            }
        }
        return;
    }

    let mut args = ParserArgs::dumping(Resolvers::default());
    match (desc.vtable.dump)(native.as_ref(), &mut args) {
        Err(ParseError::NativeMismatch(what)) => {
            violations.push(format!("{name}: dump probe hit native mismatch on {what}"));
        }
        _ => {
            for diag in args.errors() {
                if matches!(diag.error, ParseError::NativeMismatch(_)) {
                    violations.push(format!(
                        "{name}: dump probe recorded mismatch at {}",
                        diag.source_path
                    ));
                }
            }
        }
    }

    // Sequence and pointer wrappers additionally verify the element
    // downcast by parsing a trivial input.
    if matches!(
        desc.model,
        Model::List { .. } | Model::NtArray { .. } | Model::NtPtrArray { .. } | Model::Ptr { .. }
    ) {
        for input in [json!([Value::Null]), json!([{}]), Value::Null, json!({})] {
            let mut native = (desc.vtable.new)();
            let mut args = ParserArgs::parsing(Resolvers::default());
            let _ = (desc.vtable.parse)(native.as_mut(), &input, &mut args);
            for diag in args.errors() {
                if matches!(diag.error, ParseError::NativeMismatch(_)) {
                    violations.push(format!(
                        "{name}: parse probe recorded mismatch at {}",
                        diag.source_path
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FlagBit, LinkedField, Model, OpenApiType, VTable};
    use crate::macros::{field_of, flag_vtable, leaf_vtable};
    use crate::model::Node;
    use crate::version::ProtocolVersion;

    fn scratch_vtable() -> VTable {
        leaf_vtable!(
            u16,
            crate::codec::scalars::parse_u16,
            crate::codec::scalars::dump_u16
        )
    }

    fn table_with(desc: Descriptor) -> HashMap<TypeId, Descriptor> {
        // Full registry plus one extra descriptor under scrutiny; the
        // extra one reuses an id so coverage checks stay quiet.
        let mut table = HashMap::new();
        for d in crate::registry::scalars::descriptors()
            .into_iter()
            .chain(crate::registry::job::descriptors())
            .chain(crate::registry::cluster::descriptors())
            .chain(crate::registry::acct::descriptors())
            .chain(crate::registry::burst::descriptors())
        {
            table.insert(d.type_id, d);
        }
        table.insert(desc.type_id, desc);
        table
    }

    #[test]
    fn test_clean_registry_has_no_violations() {
        let table = table_with(Descriptor::new(
            TypeId::UInt16,
            "UINT16",
            "u16",
            Model::Simple,
            OpenApiType::Int32,
            scratch_vtable(),
        ));
        assert_eq!(check_table(&table), Vec::<String>::new());
    }

    #[test]
    fn test_equal_after_bit_detected() {
        static BAD_BITS: &[FlagBit] = &[
            FlagBit::bit("A", 0x1),
            FlagBit::equal("B", 0x2, 0x6),
        ];
        let table = table_with(Descriptor::new(
            TypeId::QosFlags,
            "QOS_FLAGS",
            "u16",
            Model::FlagArray {
                bits: BAD_BITS,
                width: 16,
                single_flag: false,
            },
            OpenApiType::Array,
            flag_vtable!(u16, TypeId::QosFlags),
        ));
        let violations = check_table(&table);
        assert!(violations.iter().any(|v| v.contains("declared after a BIT")));
    }

    #[test]
    fn test_bit_escaping_width_detected() {
        static WIDE_BITS: &[FlagBit] = &[FlagBit::bit("HUGE", 0x1_0000)];
        let table = table_with(Descriptor::new(
            TypeId::QosFlags,
            "QOS_FLAGS",
            "u16",
            Model::FlagArray {
                bits: WIDE_BITS,
                width: 16,
                single_flag: false,
            },
            OpenApiType::Array,
            flag_vtable!(u16, TypeId::QosFlags),
        ));
        let violations = check_table(&table);
        assert!(violations.iter().any(|v| v.contains("does not fit")));
    }

    #[test]
    fn test_duplicate_key_detected() {
        fn fields() -> &'static [LinkedField] {
            static FIELDS: once_cell::sync::Lazy<Vec<LinkedField>> =
                once_cell::sync::Lazy::new(|| {
                    vec![
                        LinkedField::new("name", "name", TypeId::String)
                            .with_accessor(field_of!(Node, name)),
                        LinkedField::new("name", "hostname", TypeId::String)
                            .with_accessor(field_of!(Node, hostname)),
                    ]
                });
            FIELDS.as_slice()
        }
        let table = table_with(Descriptor::new(
            TypeId::Node,
            "NODE",
            "Node",
            Model::Composite { fields: fields() },
            OpenApiType::Object,
            crate::macros::composite_vtable!(Node, TypeId::Node),
        ));
        let violations = check_table(&table);
        assert!(violations.iter().any(|v| v.contains("duplicate key")));
    }

    #[test]
    fn test_overload_count_mismatch_detected() {
        fn fields() -> &'static [LinkedField] {
            static FIELDS: once_cell::sync::Lazy<Vec<LinkedField>> =
                once_cell::sync::Lazy::new(|| {
                    vec![
                        LinkedField::new("a", "state", TypeId::UInt32)
                            .overloaded(2)
                            .with_accessor(field_of!(Node, state)),
                        LinkedField::new("b", "state", TypeId::UInt32)
                            .with_accessor(field_of!(Node, state)),
                    ]
                });
            FIELDS.as_slice()
        }
        let table = table_with(Descriptor::new(
            TypeId::Node,
            "NODE",
            "Node",
            Model::Composite { fields: fields() },
            OpenApiType::Object,
            crate::macros::composite_vtable!(Node, TypeId::Node),
        ));
        let violations = check_table(&table);
        assert!(violations.iter().any(|v| v.contains("overloads")));
    }

    #[test]
    fn test_removed_with_storage_detected() {
        fn fields() -> &'static [LinkedField] {
            static FIELDS: once_cell::sync::Lazy<Vec<LinkedField>> =
                once_cell::sync::Lazy::new(|| {
                    vec![LinkedField::removed("old", ProtocolVersion::V23_11)
                        .with_accessor(field_of!(Node, state))]
                });
            FIELDS.as_slice()
        }
        let table = table_with(Descriptor::new(
            TypeId::Node,
            "NODE",
            "Node",
            Model::Composite { fields: fields() },
            OpenApiType::Object,
            crate::macros::composite_vtable!(Node, TypeId::Node),
        ));
        let violations = check_table(&table);
        assert!(violations
            .iter()
            .any(|v| v.contains("must carry no native storage")));
    }

    #[test]
    fn test_accessor_type_mismatch_detected() {
        // Accessor reaches a u32 field but the row claims a string type.
        fn fields() -> &'static [LinkedField] {
            static FIELDS: once_cell::sync::Lazy<Vec<LinkedField>> =
                once_cell::sync::Lazy::new(|| {
                    vec![LinkedField::new("state", "state", TypeId::String)
                        .with_accessor(field_of!(Node, state))]
                });
            FIELDS.as_slice()
        }
        let table = table_with(Descriptor::new(
            TypeId::Node,
            "NODE",
            "Node",
            Model::Composite { fields: fields() },
            OpenApiType::Object,
            crate::macros::composite_vtable!(Node, TypeId::Node),
        ));
        let violations = check_table(&table);
        assert!(violations.iter().any(|v| v.contains("disagrees")));
    }
}
