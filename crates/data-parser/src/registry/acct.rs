//! Accounting descriptor tables: QoS, associations, and TRES.

use crate::descriptor::{Descriptor, FlagBit, LinkedField, Model, OpenApiType, TypeId};
use crate::macros::{composite_vtable, field_of, flag_vtable, list_vtable, ptr_vtable};
use crate::model::qos::*;
use crate::model::{AssocShort, Association, Qos, Tres};
use crate::resolvers::Needs;
use once_cell::sync::Lazy;

static QOS_FLAG_BITS: &[FlagBit] = &[
    FlagBit::bit("ENFORCE_USAGE_THRESHOLD", QOS_FLAG_ENFORCE_USAGE_THRESHOLD as u64),
    FlagBit::bit("NO_RESERVE", QOS_FLAG_NO_RESERVE as u64),
    FlagBit::bit("PARTITION_MAXIMUM_NODES", QOS_FLAG_PARTITION_MAX_NODES as u64),
    FlagBit::bit("PARTITION_MINIMUM_NODES", QOS_FLAG_PARTITION_MIN_NODES as u64),
    FlagBit::bit("OVERRIDE_PARTITION_QOS", QOS_FLAG_OVERRIDE_PARTITION_QOS as u64),
    FlagBit::bit("NO_DECAY", QOS_FLAG_NO_DECAY as u64),
    FlagBit::bit("USAGE_FACTOR_SAFE", QOS_FLAG_USAGE_FACTOR_SAFE as u64),
    FlagBit::bit("DELETED", QOS_FLAG_DELETED as u64).hide(),
];

fn qos_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("description", "description", TypeId::String)
                .with_accessor(field_of!(Qos, description)),
            LinkedField::new("flags", "flags", TypeId::QosFlags)
                .with_accessor(field_of!(Qos, flags)),
            LinkedField::new("id", "id", TypeId::UInt32).with_accessor(field_of!(Qos, id)),
            LinkedField::new("limits", "", TypeId::QosLimits).whole(),
            LinkedField::new("name", "name", TypeId::String)
                .required()
                .with_accessor(field_of!(Qos, name)),
            LinkedField::new("preempt", "preempt", TypeId::CsvString)
                .with_accessor(field_of!(Qos, preempt)),
            LinkedField::new("priority", "priority", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Qos, priority)),
            LinkedField::new("usage_factor", "usage_factor", TypeId::Float64NoVal)
                .with_accessor(field_of!(Qos, usage_factor)),
            LinkedField::new("usage_threshold", "usage_threshold", TypeId::Float64NoVal)
                .with_accessor(field_of!(Qos, usage_threshold)),
        ]
    });
    FIELDS.as_slice()
}

/// Limits projected under the `limits` key.
fn qos_limits_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("max_jobs_per_user", "max_jobs_per_user", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Qos, max_jobs_per_user)),
            LinkedField::new(
                "max_submit_jobs_per_user",
                "max_submit_jobs_per_user",
                TypeId::UInt32NoVal,
            )
            .with_accessor(field_of!(Qos, max_submit_jobs_per_user)),
            LinkedField::new("max_tres_per_job", "max_tres_per_job", TypeId::TresString)
                .with_accessor(field_of!(Qos, max_tres_per_job)),
            LinkedField::new("max_wall_per_job", "max_wall_per_job", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Qos, max_wall_per_job)),
            LinkedField::new(
                "min_priority_threshold",
                "min_priority_threshold",
                TypeId::UInt32NoVal,
            )
            .with_accessor(field_of!(Qos, min_priority_threshold)),
        ]
    });
    FIELDS.as_slice()
}

fn association_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("account", "account", TypeId::String)
                .with_accessor(field_of!(Association, account)),
            LinkedField::new("cluster", "cluster", TypeId::String)
                .with_accessor(field_of!(Association, cluster)),
            LinkedField::new("default_qos", "default_qos", TypeId::QosId)
                .with_accessor(field_of!(Association, default_qos)),
            LinkedField::new("id", "id", TypeId::UInt32).with_accessor(field_of!(Association, id)),
            LinkedField::new("max_jobs", "max_jobs", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Association, max_jobs)),
            LinkedField::new("max_tres_per_job", "max_tres_per_job", TypeId::TresString)
                .with_accessor(field_of!(Association, max_tres_per_job)),
            LinkedField::new("partition", "partition", TypeId::String)
                .with_accessor(field_of!(Association, partition)),
            LinkedField::new("qos", "qos", TypeId::CsvString)
                .with_accessor(field_of!(Association, qos)),
            LinkedField::new("shares_raw", "shares_raw", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Association, shares_raw)),
            LinkedField::new("user", "user", TypeId::String)
                .required()
                .with_accessor(field_of!(Association, user)),
        ]
    });
    FIELDS.as_slice()
}

fn assoc_short_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("account", "account", TypeId::String)
                .with_accessor(field_of!(AssocShort, account)),
            LinkedField::new("cluster", "cluster", TypeId::String)
                .with_accessor(field_of!(AssocShort, cluster)),
            LinkedField::new("id", "id", TypeId::UInt32).with_accessor(field_of!(AssocShort, id)),
            LinkedField::new("partition", "partition", TypeId::String)
                .with_accessor(field_of!(AssocShort, partition)),
            LinkedField::new("user", "user", TypeId::String)
                .required()
                .with_accessor(field_of!(AssocShort, user)),
        ]
    });
    FIELDS.as_slice()
}

fn tres_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("count", "count", TypeId::UInt64NoVal)
                .with_accessor(field_of!(Tres, count)),
            LinkedField::new("id", "id", TypeId::UInt32).with_accessor(field_of!(Tres, id)),
            LinkedField::new("name", "name", TypeId::String).with_accessor(field_of!(Tres, name)),
            LinkedField::new("type", "type", TypeId::String)
                .required()
                .with_accessor(field_of!(Tres, r#type)),
        ]
    });
    FIELDS.as_slice()
}

pub(crate) fn descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::new(
            TypeId::QosFlags,
            "QOS_FLAGS",
            "u32",
            Model::FlagArray {
                bits: QOS_FLAG_BITS,
                width: 32,
                single_flag: false,
            },
            OpenApiType::Array,
            flag_vtable!(u32, TypeId::QosFlags),
        ),
        Descriptor::new(
            TypeId::Qos,
            "QOS",
            "Qos",
            Model::Composite {
                fields: qos_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(Qos, TypeId::Qos),
        )
        .with_needs(Needs::TRES),
        Descriptor::new(
            TypeId::QosLimits,
            "QOS_LIMITS",
            "Qos",
            Model::Composite {
                fields: qos_limits_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(Qos, TypeId::QosLimits),
        )
        .with_needs(Needs::TRES),
        Descriptor::new(
            TypeId::Association,
            "ASSOCIATION",
            "Association",
            Model::Composite {
                fields: association_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(Association, TypeId::Association),
        )
        .with_needs(Needs::QOS.union(Needs::TRES)),
        Descriptor::new(
            TypeId::AssocShort,
            "ASSOC_SHORT",
            "AssocShort",
            Model::Composite {
                fields: assoc_short_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(AssocShort, TypeId::AssocShort),
        )
        .describe("the four-field association key plus resolved id"),
        Descriptor::new(
            TypeId::Tres,
            "TRES",
            "Tres",
            Model::Composite {
                fields: tres_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(Tres, TypeId::Tres),
        ),
        Descriptor::new(
            TypeId::QosList,
            "QOS_LIST",
            "Vec<Qos>",
            Model::List {
                element: TypeId::Qos,
            },
            OpenApiType::Array,
            list_vtable!(Qos, TypeId::QosList),
        )
        .with_needs(Needs::TRES),
        Descriptor::new(
            TypeId::TresList,
            "TRES_LIST",
            "Vec<Tres>",
            Model::List {
                element: TypeId::Tres,
            },
            OpenApiType::Array,
            list_vtable!(Tres, TypeId::TresList),
        ),
        Descriptor::new(
            TypeId::AssocList,
            "ASSOC_LIST",
            "Vec<Association>",
            Model::List {
                element: TypeId::Association,
            },
            OpenApiType::Array,
            list_vtable!(Association, TypeId::AssocList),
        )
        .with_needs(Needs::QOS.union(Needs::TRES)),
        Descriptor::new(
            TypeId::AssocShortPtr,
            "ASSOC_SHORT_PTR",
            "Option<AssocShort>",
            Model::Ptr {
                target: TypeId::AssocShort,
                allow_null: true,
            },
            OpenApiType::Object,
            ptr_vtable!(AssocShort, TypeId::AssocShortPtr),
        ),
    ]
}
