//! Leaf descriptor table: plain scalars, tri-state numerics, and the
//! specialized single-field codecs.

use crate::codec;
use crate::descriptor::{Descriptor, Model, OpenApiType, TypeId};
use crate::macros::leaf_vtable;
use crate::model::{
    Bitmap, Hostlist, JobInfo, TriBool, TriF64, TriI64, TriTime, TriU16, TriU32, TriU64,
};
use crate::resolvers::Needs;

pub(crate) fn descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::new(
            TypeId::String,
            "STRING",
            "Option<String>",
            Model::Simple,
            OpenApiType::String,
            leaf_vtable!(
                Option<String>,
                codec::scalars::parse_string,
                codec::scalars::dump_string
            ),
        ),
        Descriptor::new(
            TypeId::CsvString,
            "CSV_STRING",
            "Vec<String>",
            Model::Simple,
            OpenApiType::Array,
            leaf_vtable!(Vec<String>, codec::csv::parse_csv, codec::csv::dump_csv),
        )
        .describe("comma-delimited string, list of strings, or k=v dict"),
        Descriptor::new(
            TypeId::Bool,
            "BOOL",
            "bool",
            Model::Simple,
            OpenApiType::Bool,
            leaf_vtable!(bool, codec::scalars::parse_bool, codec::scalars::dump_bool),
        ),
        Descriptor::new(
            TypeId::UInt16,
            "UINT16",
            "u16",
            Model::Simple,
            OpenApiType::Int32,
            leaf_vtable!(u16, codec::scalars::parse_u16, codec::scalars::dump_u16),
        ),
        Descriptor::new(
            TypeId::UInt32,
            "UINT32",
            "u32",
            Model::Simple,
            OpenApiType::Int64,
            leaf_vtable!(u32, codec::scalars::parse_u32, codec::scalars::dump_u32),
        ),
        Descriptor::new(
            TypeId::UInt64,
            "UINT64",
            "u64",
            Model::Simple,
            OpenApiType::Int64,
            leaf_vtable!(u64, codec::scalars::parse_u64, codec::scalars::dump_u64),
        ),
        Descriptor::new(
            TypeId::Int32,
            "INT32",
            "i32",
            Model::Simple,
            OpenApiType::Int32,
            leaf_vtable!(i32, codec::scalars::parse_i32, codec::scalars::dump_i32),
        ),
        Descriptor::new(
            TypeId::Int64,
            "INT64",
            "i64",
            Model::Simple,
            OpenApiType::Int64,
            leaf_vtable!(i64, codec::scalars::parse_i64, codec::scalars::dump_i64),
        ),
        Descriptor::new(
            TypeId::Float64,
            "FLOAT64",
            "f64",
            Model::Simple,
            OpenApiType::Double,
            leaf_vtable!(f64, codec::scalars::parse_f64, codec::scalars::dump_f64),
        ),
        // Tri-state wrapped numerics.
        Descriptor::new(
            TypeId::UInt16NoVal,
            "UINT16_NO_VAL",
            "TriU16",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(TriU16, codec::noval::parse_tri_u16, codec::noval::dump_tri_u16),
        ),
        Descriptor::new(
            TypeId::UInt32NoVal,
            "UINT32_NO_VAL",
            "TriU32",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(TriU32, codec::noval::parse_tri_u32, codec::noval::dump_tri_u32),
        ),
        Descriptor::new(
            TypeId::UInt64NoVal,
            "UINT64_NO_VAL",
            "TriU64",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(TriU64, codec::noval::parse_tri_u64, codec::noval::dump_tri_u64),
        ),
        Descriptor::new(
            TypeId::Int64NoVal,
            "INT64_NO_VAL",
            "TriI64",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(TriI64, codec::noval::parse_tri_i64, codec::noval::dump_tri_i64),
        ),
        Descriptor::new(
            TypeId::Float64NoVal,
            "FLOAT64_NO_VAL",
            "TriF64",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(TriF64, codec::noval::parse_tri_f64, codec::noval::dump_tri_f64),
        ),
        Descriptor::new(
            TypeId::Bool16NoVal,
            "BOOL16_NO_VAL",
            "TriBool",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(
                TriBool,
                codec::noval::parse_tri_bool,
                codec::noval::dump_tri_bool
            ),
        ),
        Descriptor::new(
            TypeId::TimestampNoVal,
            "TIMESTAMP_NO_VAL",
            "TriTime",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(
                TriTime,
                codec::noval::parse_tri_time,
                codec::noval::dump_tri_time
            ),
        )
        .describe("seconds since epoch; accepts absolute and now+offset strings"),
        // Specialized leaves.
        Descriptor::new(
            TypeId::Timestamp,
            "TIMESTAMP",
            "i64",
            Model::Simple,
            OpenApiType::Int64,
            leaf_vtable!(i64, codec::time::parse_timestamp, codec::time::dump_timestamp),
        )
        .describe("seconds since epoch; accepts absolute and now+offset strings"),
        Descriptor::new(
            TypeId::SignalName,
            "SIGNAL_NAME",
            "u16",
            Model::Simple,
            OpenApiType::String,
            leaf_vtable!(u16, codec::signal::parse_signal, codec::signal::dump_signal),
        )
        .describe("signal number or symbolic name"),
        Descriptor::new(
            TypeId::BitmapString,
            "BITSTRING",
            "Bitmap",
            Model::Simple,
            OpenApiType::String,
            leaf_vtable!(
                Bitmap,
                codec::bitstring::parse_bitstring,
                codec::bitstring::dump_bitstring
            ),
        )
        .describe("range list, e.g. 0-3,7,12-15"),
        Descriptor::new(
            TypeId::HostlistExpr,
            "HOSTLIST",
            "Hostlist",
            Model::Simple,
            OpenApiType::Array,
            leaf_vtable!(
                Hostlist,
                codec::hostlist::parse_hostlist,
                codec::hostlist::dump_hostlist
            ),
        )
        .describe("compressed range expression or array of node names"),
        Descriptor::new(
            TypeId::ProcessExitCode,
            "PROCESS_EXIT_CODE",
            "u32",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(
                u32,
                codec::exit_code::parse_exit_code,
                codec::exit_code::dump_exit_code
            ),
        )
        .describe("POSIX wait status decoded to a tagged object"),
        Descriptor::new(
            TypeId::MemoryPerCpu,
            "MEMORY_PER_CPU",
            "u64",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(
                u64,
                codec::memory::parse_mem_per_cpu,
                codec::memory::dump_mem_per_cpu
            ),
        )
        .describe("MiB per allocated CPU; high-bit tagged variant of the memory field"),
        Descriptor::new(
            TypeId::MemoryPerNode,
            "MEMORY_PER_NODE",
            "u64",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(
                u64,
                codec::memory::parse_mem_per_node,
                codec::memory::dump_mem_per_node
            ),
        )
        .describe("MiB per node; untagged variant of the memory field"),
        Descriptor::new(
            TypeId::Nice,
            "NICE",
            "u32",
            Model::Simple,
            OpenApiType::Int32,
            leaf_vtable!(u32, codec::tagged::parse_nice, codec::tagged::dump_nice),
        )
        .describe("signed scheduling priority adjustment, stored offset-encoded"),
        Descriptor::new(
            TypeId::CoreSpec,
            "CORE_SPEC",
            "u16",
            Model::Simple,
            OpenApiType::Int32,
            leaf_vtable!(
                u16,
                codec::tagged::parse_core_spec,
                codec::tagged::dump_core_spec
            ),
        ),
        Descriptor::new(
            TypeId::ThreadSpec,
            "THREAD_SPEC",
            "u16",
            Model::Simple,
            OpenApiType::Int32,
            leaf_vtable!(
                u16,
                codec::tagged::parse_thread_spec,
                codec::tagged::dump_thread_spec
            ),
        ),
        Descriptor::new(
            TypeId::Hold,
            "HOLD",
            "TriU32",
            Model::Simple,
            OpenApiType::Bool,
            leaf_vtable!(TriU32, codec::tagged::parse_hold, codec::tagged::dump_hold),
        )
        .describe("parse-only shorthand: true pins priority to zero"),
        Descriptor::new(
            TypeId::QosId,
            "QOS_ID",
            "u32",
            Model::Simple,
            OpenApiType::String,
            leaf_vtable!(u32, codec::resolved::parse_qos_id, codec::resolved::dump_qos_id),
        )
        .with_needs(Needs::QOS),
        Descriptor::new(
            TypeId::QosName,
            "QOS_NAME",
            "Option<String>",
            Model::Simple,
            OpenApiType::String,
            leaf_vtable!(
                Option<String>,
                codec::scalars::parse_string,
                codec::scalars::dump_string
            ),
        ),
        Descriptor::new(
            TypeId::AssocId,
            "ASSOC_ID",
            "u32",
            Model::Simple,
            OpenApiType::Object,
            leaf_vtable!(
                u32,
                codec::resolved::parse_assoc_id,
                codec::resolved::dump_assoc_id
            ),
        )
        .with_needs(Needs::ASSOC),
        Descriptor::new(
            TypeId::UserId,
            "USER_ID",
            "u32",
            Model::Simple,
            OpenApiType::String,
            leaf_vtable!(
                u32,
                codec::resolved::parse_user_id,
                codec::resolved::dump_user_id
            ),
        )
        .with_needs(Needs::AUTH),
        Descriptor::new(
            TypeId::GroupId,
            "GROUP_ID",
            "u32",
            Model::Simple,
            OpenApiType::String,
            leaf_vtable!(
                u32,
                codec::resolved::parse_group_id,
                codec::resolved::dump_group_id
            ),
        )
        .with_needs(Needs::AUTH),
        Descriptor::new(
            TypeId::TresString,
            "TRES_STRING",
            "Option<String>",
            Model::Simple,
            OpenApiType::Array,
            leaf_vtable!(
                Option<String>,
                codec::resolved::parse_tres_string,
                codec::resolved::dump_tres_string
            ),
        )
        .with_needs(Needs::TRES)
        .describe("canonical id=count pairs, decomposed to TRES objects on dump"),
        Descriptor::new(
            TypeId::TresNct,
            "TRES_NCT",
            "JobInfo",
            Model::Complex,
            OpenApiType::Array,
            leaf_vtable!(
                JobInfo,
                codec::resolved::parse_tres_nct,
                codec::resolved::dump_tres_nct
            ),
        )
        .with_needs(Needs::TRES)
        .describe("per-node TRES projection joined with the job hostlist"),
        Descriptor::new(
            TypeId::BurstBufferSize,
            "BURST_BUFFER_SIZE",
            "u64",
            Model::Simple,
            OpenApiType::Int64,
            leaf_vtable!(u64, codec::burst::parse_bb_size, codec::burst::dump_bb_size),
        )
        .describe("GB, with M/G/T/P suffixes; N switches to whole nodes"),
    ]
}
