//! Quality-of-service record.

use super::tri::{TriF64, TriU32};

// QoS behavior flags.
pub const QOS_FLAG_ENFORCE_USAGE_THRESHOLD: u32 = 0x0001;
pub const QOS_FLAG_NO_RESERVE: u32 = 0x0002;
pub const QOS_FLAG_PARTITION_MAX_NODES: u32 = 0x0004;
pub const QOS_FLAG_PARTITION_MIN_NODES: u32 = 0x0008;
pub const QOS_FLAG_OVERRIDE_PARTITION_QOS: u32 = 0x0010;
pub const QOS_FLAG_NO_DECAY: u32 = 0x0020;
pub const QOS_FLAG_USAGE_FACTOR_SAFE: u32 = 0x0040;
/// Internal marker for deleted-but-referenced QoS; never dumped.
pub const QOS_FLAG_DELETED: u32 = 0x8000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Qos {
    pub id: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: TriU32,
    /// `QosFlags` bitfield.
    pub flags: u32,
    /// QoS names this one may preempt.
    pub preempt: Vec<String>,
    pub usage_factor: TriF64,
    pub usage_threshold: TriF64,

    // Limits, projected under the "limits" key on the wire.
    pub max_tres_per_job: Option<String>,
    pub max_jobs_per_user: TriU32,
    pub max_submit_jobs_per_user: TriU32,
    /// Minutes.
    pub max_wall_per_job: TriU32,
    pub min_priority_threshold: TriU32,
}
