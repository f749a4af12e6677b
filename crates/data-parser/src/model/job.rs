//! Job submission and job record structures.

use super::hostlist::Hostlist;
use super::tri::{TriTime, TriU16, TriU32};
use super::{AssocShort, NICE_OFFSET, NO_VAL64};

// Job behavior flags.
pub const JOB_FLAG_KILL_INV_DEP: u64 = 0x0001;
pub const JOB_FLAG_NO_KILL_INV_DEP: u64 = 0x0002;
pub const JOB_FLAG_REQUEUE: u64 = 0x0004;
pub const JOB_FLAG_REBOOT: u64 = 0x0008;
pub const JOB_FLAG_SPREAD: u64 = 0x0010;
pub const JOB_FLAG_GRES_DISABLE_BIND: u64 = 0x0020;
pub const JOB_FLAG_WAIT_ALL_NODES: u64 = 0x0040;
/// Submitted by the cron surface; internal, never dumped.
pub const JOB_FLAG_CRON: u64 = 0x0080;

// Oversubscription modes, exclusive under the low two bits.
pub const JOB_SHARED_BASE: u16 = 0x0003;
pub const JOB_SHARED_NONE: u16 = 0x0;
pub const JOB_SHARED_OVERSUBSCRIBE: u16 = 0x1;
pub const JOB_SHARED_USER: u16 = 0x2;
pub const JOB_SHARED_MCS: u16 = 0x3;

/// An incoming job request. Parsed from a submission tree; dumped back
/// for echo/inspection endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub account: Option<String>,
    pub comment: Option<String>,
    pub name: Option<String>,
    pub partition: Option<String>,
    pub dependency: Option<String>,

    /// Numeric QoS id, resolved from a name on parse.
    pub qos_id: u32,
    pub user_id: u32,
    pub group_id: u32,

    pub priority: TriU32,
    /// Offset-encoded: stores wire nice + `NICE_OFFSET`.
    pub nice: u32,

    /// Memory request in MiB. The `MEM_PER_CPU` high bit selects the
    /// per-CPU interpretation; clear means per node. `NO_VAL64` = unset.
    pub req_mem: u64,

    pub min_cpus: TriU32,
    pub min_nodes: TriU32,

    /// Minutes. Infinite = no limit.
    pub time_limit: TriU32,
    pub begin_time: TriTime,
    pub deadline: TriTime,

    /// Signal sent ahead of the time limit.
    pub kill_warning_signal: u16,
    pub kill_warning_delay: TriU16,

    /// Specialized cores; the `CORE_SPEC_THREAD` high bit switches the
    /// count to threads.
    pub core_spec: u16,

    /// Oversubscription mode, one of the `JobShared` states.
    pub shared: u16,

    /// `JobFlags` bitfield.
    pub flags: u64,

    pub required_nodes: Hostlist,
    pub excluded_nodes: Hostlist,

    pub environment: Vec<String>,
    pub argv: Vec<String>,

    /// Canonical TRES request, `id=count` pairs.
    pub tres_per_job: Option<String>,
}

impl Default for JobDescription {
    fn default() -> Self {
        Self {
            account: None,
            comment: None,
            name: None,
            partition: None,
            dependency: None,
            qos_id: 0,
            user_id: 0,
            group_id: 0,
            priority: TriU32::Unset,
            nice: NICE_OFFSET,
            req_mem: NO_VAL64,
            min_cpus: TriU32::Unset,
            min_nodes: TriU32::Unset,
            time_limit: TriU32::Unset,
            begin_time: TriTime::Unset,
            deadline: TriTime::Unset,
            kill_warning_signal: 0,
            kill_warning_delay: TriU16::Unset,
            core_spec: 0,
            shared: 0,
            flags: 0,
            required_nodes: Hostlist::default(),
            excluded_nodes: Hostlist::default(),
            environment: Vec::new(),
            argv: Vec::new(),
            tres_per_job: None,
        }
    }
}

/// A scheduled or finished job as reported by the controller.
/// Dump-only on the REST surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobInfo {
    pub job_id: u32,
    pub name: Option<String>,
    pub user_id: u32,
    pub partition: Option<String>,
    pub nodes: Hostlist,

    /// POSIX wait status word; `NO_VAL` while the job is pending.
    pub exit_code: u32,

    /// `JobFlags` bitfield.
    pub flags: u64,

    pub priority: TriU32,
    pub start_time: TriTime,
    pub end_time: TriTime,

    /// Allocated TRES, canonical `id=count` pairs.
    pub tres_alloc: Option<String>,
    /// Per-node TRES allocations, one canonical string per entry of
    /// `nodes`, in hostlist order.
    pub tres_per_node: Vec<String>,
    /// CPUs allocated per node, in hostlist order.
    pub cpus_per_node: Vec<u32>,

    pub association: Option<AssocShort>,
}
