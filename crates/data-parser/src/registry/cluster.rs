//! Node, partition, and reservation descriptor tables.

use crate::descriptor::{Descriptor, FlagBit, LinkedField, Model, OpenApiType, TypeId};
use crate::macros::{composite_vtable, field_of, flag_vtable, list_vtable, ptr_vtable};
use crate::model::node::*;
use crate::model::partition::*;
use crate::model::reservation::*;
use crate::model::{Bitmap, Node, Partition, Reservation};
use crate::resolvers::Needs;
use crate::version::ProtocolVersion;
use once_cell::sync::Lazy;

static NODE_STATE_BITS: &[FlagBit] = &[
    // Exclusive base states first; the engine dumps at most one.
    FlagBit::equal("UNKNOWN", NODE_STATE_UNKNOWN as u64, NODE_STATE_BASE as u64),
    FlagBit::equal("DOWN", NODE_STATE_DOWN as u64, NODE_STATE_BASE as u64),
    FlagBit::equal("IDLE", NODE_STATE_IDLE as u64, NODE_STATE_BASE as u64),
    FlagBit::equal("ALLOCATED", NODE_STATE_ALLOCATED as u64, NODE_STATE_BASE as u64),
    FlagBit::equal("ERROR", NODE_STATE_ERROR as u64, NODE_STATE_BASE as u64),
    FlagBit::equal("MIXED", NODE_STATE_MIXED as u64, NODE_STATE_BASE as u64),
    FlagBit::equal("FUTURE", NODE_STATE_FUTURE as u64, NODE_STATE_BASE as u64),
    // Independent modifier flags, in dump order.
    FlagBit::bit("DRAIN", NODE_STATE_DRAIN as u64),
    FlagBit::bit("COMPLETING", NODE_STATE_COMPLETING as u64),
    FlagBit::bit("NOT_RESPONDING", NODE_STATE_NO_RESPOND as u64),
    FlagBit::bit("POWERED_DOWN", NODE_STATE_POWERED_DOWN as u64),
    FlagBit::bit("FAIL", NODE_STATE_FAIL as u64),
    FlagBit::bit("MAINTENANCE", NODE_STATE_MAINT as u64),
    FlagBit::bit("REBOOT_REQUESTED", NODE_STATE_REBOOT_REQUESTED as u64),
    FlagBit::bit("PERFCTRS", NODE_STATE_NET as u64)
        .describe("network performance counters reserved"),
    FlagBit::bit("CLOUD", NODE_STATE_CLOUD as u64).hide(),
];

static PARTITION_STATE_BITS: &[FlagBit] = &[
    FlagBit::equal("DOWN", PARTITION_DOWN as u64, PARTITION_STATE_BASE as u64),
    FlagBit::equal("DRAIN", PARTITION_DRAIN as u64, PARTITION_STATE_BASE as u64),
    FlagBit::equal("INACTIVE", PARTITION_INACTIVE as u64, PARTITION_STATE_BASE as u64),
    FlagBit::equal("UP", PARTITION_UP as u64, PARTITION_STATE_BASE as u64),
];

static RESERVATION_FLAG_BITS: &[FlagBit] = &[
    FlagBit::bit("MAINT", RESERVE_FLAG_MAINT),
    FlagBit::bit("DAILY", RESERVE_FLAG_DAILY),
    FlagBit::bit("WEEKLY", RESERVE_FLAG_WEEKLY),
    FlagBit::bit("IGNORE_JOBS", RESERVE_FLAG_IGNORE_JOBS),
    FlagBit::bit("ANY_NODES", RESERVE_FLAG_ANY_NODES),
    FlagBit::bit("STATIC", RESERVE_FLAG_STATIC),
    FlagBit::bit("PART_NODES", RESERVE_FLAG_PART_NODES),
    FlagBit::bit("FLEX", RESERVE_FLAG_FLEX),
];

fn node_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("boot_time", "boot_time", TypeId::TimestampNoVal)
                .with_accessor(field_of!(Node, boot_time)),
            LinkedField::new("cpus", "cpus", TypeId::UInt16NoVal)
                .with_accessor(field_of!(Node, cpus)),
            LinkedField::new("features", "features", TypeId::CsvString)
                .with_accessor(field_of!(Node, features)),
            // Superseded by the TRES rendering; still parsed and dumped
            // for old clients.
            LinkedField::new("gres", "gres", TypeId::String)
                .deprecated_since(ProtocolVersion::V23_11)
                .with_accessor(field_of!(Node, gres)),
            LinkedField::new("hostname", "hostname", TypeId::String)
                .with_accessor(field_of!(Node, hostname)),
            LinkedField::new("name", "name", TypeId::String).with_accessor(field_of!(Node, name)),
            LinkedField::new("partitions", "partitions", TypeId::CsvString)
                .with_accessor(field_of!(Node, partitions)),
            LinkedField::new("real_memory", "real_memory", TypeId::UInt64NoVal)
                .with_accessor(field_of!(Node, real_memory)),
            LinkedField::new("reason", "reason", TypeId::String)
                .with_accessor(field_of!(Node, reason)),
            LinkedField::new("reason_changed_at", "reason_time", TypeId::TimestampNoVal)
                .with_accessor(field_of!(Node, reason_time)),
            LinkedField::new("state", "state", TypeId::NodeStates)
                .with_accessor(field_of!(Node, state)),
            LinkedField::new("switch_peers", "switch_peers", TypeId::HostlistExpr)
                .with_accessor(field_of!(Node, switch_peers)),
            LinkedField::new("tres", "tres", TypeId::TresString)
                .with_accessor(field_of!(Node, tres)),
        ]
    });
    FIELDS.as_slice()
}

fn partition_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("allow_accounts", "allow_accounts", TypeId::CsvString)
                .with_accessor(field_of!(Partition, allow_accounts)),
            LinkedField::new("default_time", "default_time", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Partition, default_time)),
            LinkedField::new("deny_accounts", "deny_accounts", TypeId::CsvString)
                .with_accessor(field_of!(Partition, deny_accounts)),
            LinkedField::new("max_nodes", "max_nodes", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Partition, max_nodes)),
            LinkedField::new("max_time", "max_time", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Partition, max_time)),
            LinkedField::new("name", "name", TypeId::String)
                .with_accessor(field_of!(Partition, name)),
            LinkedField::new("nodes", "nodes", TypeId::HostlistExpr)
                .with_accessor(field_of!(Partition, nodes)),
            LinkedField::new("priority_tier", "priority_tier", TypeId::UInt16)
                .with_accessor(field_of!(Partition, priority_tier)),
            LinkedField::new("qos", "qos_default", TypeId::QosId)
                .with_accessor(field_of!(Partition, qos_default)),
            LinkedField::new("state", "state", TypeId::PartitionStates)
                .with_accessor(field_of!(Partition, state)),
        ]
    });
    FIELDS.as_slice()
}

fn reservation_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("accounts", "accounts", TypeId::CsvString)
                .with_accessor(field_of!(Reservation, accounts)),
            LinkedField::new("core_bitmap", "core_bitmap", TypeId::BitmapPtr)
                .with_accessor(field_of!(Reservation, core_bitmap)),
            LinkedField::new("core_count", "core_count", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Reservation, core_count)),
            LinkedField::new("duration", "duration", TypeId::UInt32NoVal)
                .with_accessor(field_of!(Reservation, duration)),
            LinkedField::new("end_time", "end_time", TypeId::TimestampNoVal)
                .with_accessor(field_of!(Reservation, end_time)),
            LinkedField::new("flags", "flags", TypeId::ReservationFlags)
                .with_accessor(field_of!(Reservation, flags)),
            LinkedField::new("name", "name", TypeId::String)
                .with_accessor(field_of!(Reservation, name)),
            LinkedField::new("node_list", "node_list", TypeId::HostlistExpr)
                .with_accessor(field_of!(Reservation, node_list)),
            // Internal scheduler scratch state, never exposed.
            LinkedField::skip("node_bitmap"),
            LinkedField::new("partition", "partition", TypeId::String)
                .with_accessor(field_of!(Reservation, partition)),
            LinkedField::new("start_time", "start_time", TypeId::TimestampNoVal)
                .with_accessor(field_of!(Reservation, start_time)),
            LinkedField::new("users", "users", TypeId::CsvString)
                .with_accessor(field_of!(Reservation, users)),
        ]
    });
    FIELDS.as_slice()
}

pub(crate) fn descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::new(
            TypeId::NodeStates,
            "NODE_STATES",
            "u32",
            Model::FlagArray {
                bits: NODE_STATE_BITS,
                width: 32,
                single_flag: false,
            },
            OpenApiType::Array,
            flag_vtable!(u32, TypeId::NodeStates),
        )
        .describe("exclusive base state plus modifier flags"),
        Descriptor::new(
            TypeId::PartitionStates,
            "PARTITION_STATES",
            "u16",
            Model::FlagArray {
                bits: PARTITION_STATE_BITS,
                width: 16,
                single_flag: true,
            },
            OpenApiType::String,
            flag_vtable!(u16, TypeId::PartitionStates),
        ),
        Descriptor::new(
            TypeId::ReservationFlags,
            "RESERVATION_FLAGS",
            "u64",
            Model::FlagArray {
                bits: RESERVATION_FLAG_BITS,
                width: 64,
                single_flag: false,
            },
            OpenApiType::Array,
            flag_vtable!(u64, TypeId::ReservationFlags),
        ),
        Descriptor::new(
            TypeId::Node,
            "NODE",
            "Node",
            Model::Composite {
                fields: node_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(Node, TypeId::Node),
        )
        .with_needs(Needs::TRES),
        Descriptor::new(
            TypeId::Partition,
            "PARTITION",
            "Partition",
            Model::Composite {
                fields: partition_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(Partition, TypeId::Partition),
        )
        .with_needs(Needs::QOS),
        Descriptor::new(
            TypeId::Reservation,
            "RESERVATION",
            "Reservation",
            Model::Composite {
                fields: reservation_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(Reservation, TypeId::Reservation),
        ),
        Descriptor::new(
            TypeId::NodeList,
            "NODE_LIST",
            "Vec<Node>",
            Model::List {
                element: TypeId::Node,
            },
            OpenApiType::Array,
            list_vtable!(Node, TypeId::NodeList),
        )
        .with_needs(Needs::TRES),
        Descriptor::new(
            TypeId::PartitionList,
            "PARTITION_LIST",
            "Vec<Partition>",
            Model::List {
                element: TypeId::Partition,
            },
            OpenApiType::Array,
            list_vtable!(Partition, TypeId::PartitionList),
        )
        .with_needs(Needs::QOS),
        Descriptor::new(
            TypeId::ReservationList,
            "RESERVATION_LIST",
            "Vec<Reservation>",
            Model::List {
                element: TypeId::Reservation,
            },
            OpenApiType::Array,
            list_vtable!(Reservation, TypeId::ReservationList),
        ),
        Descriptor::new(
            TypeId::BitmapPtr,
            "BITMAP_PTR",
            "Option<Bitmap>",
            Model::Ptr {
                target: TypeId::BitmapString,
                allow_null: true,
            },
            OpenApiType::String,
            ptr_vtable!(Bitmap, TypeId::BitmapPtr),
        ),
    ]
}
