//! Partition record and partition state.

use super::hostlist::Hostlist;
use super::tri::TriU32;

// Exclusive partition states, low two bits.
pub const PARTITION_STATE_BASE: u16 = 0x0003;
pub const PARTITION_DOWN: u16 = 0x0;
pub const PARTITION_DRAIN: u16 = 0x1;
pub const PARTITION_INACTIVE: u16 = 0x2;
pub const PARTITION_UP: u16 = 0x3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub name: Option<String>,
    /// `PartitionStates` single-state field.
    pub state: u16,
    pub nodes: Hostlist,
    /// Minutes.
    pub max_time: TriU32,
    pub default_time: TriU32,
    pub max_nodes: TriU32,
    pub priority_tier: u16,
    pub allow_accounts: Vec<String>,
    pub deny_accounts: Vec<String>,
    pub qos_default: u32,
}
