//! Compute node record and node state bits.

use super::hostlist::Hostlist;
use super::tri::{TriTime, TriU16, TriU64};

// Node state: low nibble is an exclusive base state, higher bits are
// independent modifier flags.
pub const NODE_STATE_BASE: u32 = 0x0000_000f;
pub const NODE_STATE_UNKNOWN: u32 = 0x0;
pub const NODE_STATE_DOWN: u32 = 0x1;
pub const NODE_STATE_IDLE: u32 = 0x2;
pub const NODE_STATE_ALLOCATED: u32 = 0x3;
pub const NODE_STATE_ERROR: u32 = 0x4;
pub const NODE_STATE_MIXED: u32 = 0x5;
pub const NODE_STATE_FUTURE: u32 = 0x6;

pub const NODE_STATE_DRAIN: u32 = 0x0000_0010;
pub const NODE_STATE_COMPLETING: u32 = 0x0000_0020;
pub const NODE_STATE_NO_RESPOND: u32 = 0x0000_0040;
pub const NODE_STATE_POWERED_DOWN: u32 = 0x0000_0080;
pub const NODE_STATE_FAIL: u32 = 0x0000_0100;
pub const NODE_STATE_MAINT: u32 = 0x0000_0200;
pub const NODE_STATE_REBOOT_REQUESTED: u32 = 0x0000_0400;
/// Network performance counters reserved; wire token `PERFCTRS`.
pub const NODE_STATE_NET: u32 = 0x0000_0800;
/// Cloud-provisioned node; internal, never dumped.
pub const NODE_STATE_CLOUD: u32 = 0x0000_1000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub hostname: Option<String>,
    /// `NodeStates` bitfield.
    pub state: u32,
    pub cpus: TriU16,
    /// MiB.
    pub real_memory: TriU64,
    pub features: Vec<String>,
    pub gres: Option<String>,
    pub reason: Option<String>,
    pub reason_time: TriTime,
    pub boot_time: TriTime,
    pub partitions: Vec<String>,
    /// Configured TRES, canonical `id=count` pairs.
    pub tres: Option<String>,
    /// Nodes sharing this node's network switch.
    pub switch_peers: Hostlist,
}
