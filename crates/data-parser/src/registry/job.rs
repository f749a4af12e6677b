//! Job descriptor tables: submission and record composites, job flag
//! arrays, and the argv/environment array types.

use crate::composite;
use crate::descriptor::{
    Descriptor, FlagBit, LinkedField, Model, OpenApiType, TypeId, VTable,
};
use crate::macros::{composite_vtable, field_of, flag_vtable, leaf_vtable, list_vtable};
use crate::model::job::*;
use crate::model::{JobDescription, JobInfo};
use crate::resolvers::Needs;
use crate::version::ProtocolVersion;
use once_cell::sync::Lazy;

static JOB_FLAG_BITS: &[FlagBit] = &[
    FlagBit::bit("KILL_INVALID_DEPENDENCY", JOB_FLAG_KILL_INV_DEP)
        .describe("cancel the job when a dependency can never be satisfied"),
    FlagBit::bit("NO_KILL_INVALID_DEPENDENCY", JOB_FLAG_NO_KILL_INV_DEP),
    FlagBit::bit("REQUEUE", JOB_FLAG_REQUEUE),
    FlagBit::bit("REBOOT", JOB_FLAG_REBOOT),
    FlagBit::bit("SPREAD_JOB", JOB_FLAG_SPREAD),
    FlagBit::bit("GRES_DISABLE_BINDING", JOB_FLAG_GRES_DISABLE_BIND),
    FlagBit::bit("WAIT_ALL_NODES", JOB_FLAG_WAIT_ALL_NODES),
    FlagBit::bit("CRON_JOB", JOB_FLAG_CRON).hide(),
];

static JOB_SHARED_BITS: &[FlagBit] = &[
    FlagBit::equal("none", JOB_SHARED_NONE as u64, JOB_SHARED_BASE as u64),
    FlagBit::equal("oversubscribe", JOB_SHARED_OVERSUBSCRIBE as u64, JOB_SHARED_BASE as u64),
    FlagBit::equal("user", JOB_SHARED_USER as u64, JOB_SHARED_BASE as u64),
    FlagBit::equal("mcs", JOB_SHARED_MCS as u64, JOB_SHARED_BASE as u64),
];

fn job_description_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("account", "account", TypeId::String)
                .with_accessor(field_of!(JobDescription, account)),
            LinkedField::new("argv", "argv", TypeId::StringArray)
                .with_accessor(field_of!(JobDescription, argv)),
            LinkedField::new("begin_time", "begin_time", TypeId::TimestampNoVal)
                .with_accessor(field_of!(JobDescription, begin_time)),
            LinkedField::new("comment", "comment", TypeId::String)
                .with_accessor(field_of!(JobDescription, comment)),
            LinkedField::new("core_specification", "core_spec", TypeId::CoreSpec)
                .overloaded(2)
                .with_accessor(field_of!(JobDescription, core_spec)),
            LinkedField::new("thread_specification", "core_spec", TypeId::ThreadSpec)
                .overloaded(2)
                .with_accessor(field_of!(JobDescription, core_spec)),
            LinkedField::new("deadline", "deadline", TypeId::TimestampNoVal)
                .with_accessor(field_of!(JobDescription, deadline)),
            LinkedField::new("dependency", "dependency", TypeId::String)
                .with_accessor(field_of!(JobDescription, dependency)),
            LinkedField::new("environment", "environment", TypeId::StringArray)
                .with_accessor(field_of!(JobDescription, environment)),
            LinkedField::new("excluded_nodes", "excluded_nodes", TypeId::HostlistExpr)
                .with_accessor(field_of!(JobDescription, excluded_nodes)),
            LinkedField::new("flags", "flags", TypeId::JobFlags)
                .with_accessor(field_of!(JobDescription, flags)),
            LinkedField::new("group_id", "group_id", TypeId::GroupId)
                .with_accessor(field_of!(JobDescription, group_id)),
            LinkedField::new("hold", "priority", TypeId::Hold)
                .overloaded(2)
                .with_accessor(field_of!(JobDescription, priority))
                .describe("true pins priority to zero"),
            LinkedField::new("kill_warning_delay", "kill_warning_delay", TypeId::UInt16NoVal)
                .with_accessor(field_of!(JobDescription, kill_warning_delay)),
            LinkedField::new("kill_warning_signal", "kill_warning_signal", TypeId::SignalName)
                .with_accessor(field_of!(JobDescription, kill_warning_signal)),
            LinkedField::new("name", "name", TypeId::String)
                .with_accessor(field_of!(JobDescription, name)),
            LinkedField::new("nice", "nice", TypeId::Nice)
                .with_accessor(field_of!(JobDescription, nice)),
            LinkedField::new("partition", "partition", TypeId::String)
                .with_accessor(field_of!(JobDescription, partition)),
            LinkedField::removed("power_flags", ProtocolVersion::V24_05),
            LinkedField::new("priority", "priority", TypeId::UInt32NoVal)
                .overloaded(2)
                .with_accessor(field_of!(JobDescription, priority)),
            LinkedField::new("qos", "qos_id", TypeId::QosId)
                .with_accessor(field_of!(JobDescription, qos_id)),
            LinkedField::new("required", "", TypeId::JobDescRequired).whole(),
            LinkedField::new("required_nodes", "required_nodes", TypeId::HostlistExpr)
                .with_accessor(field_of!(JobDescription, required_nodes)),
            LinkedField::new("shared", "shared", TypeId::JobShared)
                .with_accessor(field_of!(JobDescription, shared)),
            LinkedField::new("time_limit", "time_limit", TypeId::UInt32NoVal)
                .with_accessor(field_of!(JobDescription, time_limit)),
            LinkedField::new("tres_per_job", "tres_per_job", TypeId::TresString)
                .with_accessor(field_of!(JobDescription, tres_per_job)),
            LinkedField::new("user_id", "user_id", TypeId::UserId)
                .with_accessor(field_of!(JobDescription, user_id)),
        ]
    });
    FIELDS.as_slice()
}

/// Resource requirements projected under the `required` key; the
/// memory variants overload one tagged field.
fn job_required_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("cpus", "min_cpus", TypeId::UInt32NoVal)
                .with_accessor(field_of!(JobDescription, min_cpus)),
            LinkedField::new("memory_per_cpu", "req_mem", TypeId::MemoryPerCpu)
                .overloaded(2)
                .with_accessor(field_of!(JobDescription, req_mem)),
            LinkedField::new("memory_per_node", "req_mem", TypeId::MemoryPerNode)
                .overloaded(2)
                .with_accessor(field_of!(JobDescription, req_mem)),
            LinkedField::new("nodes", "min_nodes", TypeId::UInt32NoVal)
                .with_accessor(field_of!(JobDescription, min_nodes)),
        ]
    });
    FIELDS.as_slice()
}

fn job_info_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("association", "association", TypeId::AssocShortPtr)
                .with_accessor(field_of!(JobInfo, association)),
            LinkedField::new("cpus_per_node", "cpus_per_node", TypeId::UInt32Array)
                .with_accessor(field_of!(JobInfo, cpus_per_node)),
            LinkedField::new("end_time", "end_time", TypeId::TimestampNoVal)
                .with_accessor(field_of!(JobInfo, end_time)),
            LinkedField::new("exit_code", "exit_code", TypeId::ProcessExitCode)
                .with_accessor(field_of!(JobInfo, exit_code)),
            LinkedField::new("flags", "flags", TypeId::JobFlags)
                .with_accessor(field_of!(JobInfo, flags)),
            LinkedField::new("job_id", "job_id", TypeId::UInt32)
                .with_accessor(field_of!(JobInfo, job_id)),
            LinkedField::new("name", "name", TypeId::String)
                .with_accessor(field_of!(JobInfo, name)),
            LinkedField::new("nodes", "nodes", TypeId::HostlistExpr)
                .with_accessor(field_of!(JobInfo, nodes)),
            LinkedField::new("partition", "partition", TypeId::String)
                .with_accessor(field_of!(JobInfo, partition)),
            LinkedField::new("priority", "priority", TypeId::UInt32NoVal)
                .with_accessor(field_of!(JobInfo, priority)),
            LinkedField::new("start_time", "start_time", TypeId::TimestampNoVal)
                .with_accessor(field_of!(JobInfo, start_time)),
            LinkedField::new("tres_alloc", "tres_alloc", TypeId::TresString)
                .with_accessor(field_of!(JobInfo, tres_alloc)),
            LinkedField::new("tres_per_node", "", TypeId::TresNct).whole(),
            LinkedField::new("user_id", "user_id", TypeId::UserId)
                .with_accessor(field_of!(JobInfo, user_id)),
        ]
    });
    FIELDS.as_slice()
}

/// Job records dump through the composite walk but install the
/// "not supported" stub for parsing.
fn job_info_vtable() -> VTable {
    fn new() -> Box<dyn std::any::Any> {
        Box::new(JobInfo::default())
    }
    fn parse(
        dst: &mut dyn std::any::Any,
        src: &serde_json::Value,
        args: &mut crate::args::ParserArgs,
    ) -> Result<(), crate::error::ParseError> {
        let dst = dst
            .downcast_mut::<JobInfo>()
            .ok_or(crate::error::ParseError::NativeMismatch("JobInfo"))?;
        crate::codec::resolved::parse_job_info(dst, src, args)
    }
    fn dump(
        src: &dyn std::any::Any,
        args: &mut crate::args::ParserArgs,
    ) -> Result<Option<serde_json::Value>, crate::error::ParseError> {
        composite::dump_struct(TypeId::JobInfo, src, args)
    }
    VTable { new, parse, dump }
}

pub(crate) fn descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::new(
            TypeId::JobFlags,
            "JOB_FLAGS",
            "u64",
            Model::FlagArray {
                bits: JOB_FLAG_BITS,
                width: 64,
                single_flag: false,
            },
            OpenApiType::Array,
            flag_vtable!(u64, TypeId::JobFlags),
        ),
        Descriptor::new(
            TypeId::JobShared,
            "JOB_SHARED",
            "u16",
            Model::FlagArray {
                bits: JOB_SHARED_BITS,
                width: 16,
                single_flag: true,
            },
            OpenApiType::String,
            flag_vtable!(u16, TypeId::JobShared),
        )
        .describe("oversubscription mode"),
        Descriptor::new(
            TypeId::JobDescription,
            "JOB_DESCRIPTION",
            "JobDescription",
            Model::Composite {
                fields: job_description_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(JobDescription, TypeId::JobDescription),
        )
        .with_needs(Needs::QOS.union(Needs::TRES).union(Needs::AUTH))
        .describe("an incoming job request"),
        Descriptor::new(
            TypeId::JobDescRequired,
            "JOB_DESC_REQUIRED",
            "JobDescription",
            Model::Composite {
                fields: job_required_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(JobDescription, TypeId::JobDescRequired),
        ),
        Descriptor::new(
            TypeId::JobInfo,
            "JOB_INFO",
            "JobInfo",
            Model::Composite {
                fields: job_info_fields(),
            },
            OpenApiType::Object,
            job_info_vtable(),
        )
        .with_needs(Needs::TRES.union(Needs::AUTH).union(Needs::ASSOC))
        .describe("a scheduled or finished job; dump-only"),
        Descriptor::new(
            TypeId::StringArray,
            "STRING_ARRAY",
            "Vec<String>",
            Model::NtPtrArray {
                element: TypeId::String,
            },
            OpenApiType::Array,
            leaf_vtable!(
                Vec<String>,
                crate::containers::parse_string_array,
                crate::containers::dump_string_array
            ),
        ),
        Descriptor::new(
            TypeId::UInt32Array,
            "UINT32_ARRAY",
            "Vec<u32>",
            Model::NtArray {
                element: TypeId::UInt32,
            },
            OpenApiType::Array,
            list_vtable!(u32, TypeId::UInt32Array),
        ),
    ]
}
