//! Reservation record and reservation flags.

use super::bitmap::Bitmap;
use super::hostlist::Hostlist;
use super::tri::{TriTime, TriU32};

pub const RESERVE_FLAG_MAINT: u64 = 0x0001;
pub const RESERVE_FLAG_DAILY: u64 = 0x0002;
pub const RESERVE_FLAG_WEEKLY: u64 = 0x0004;
pub const RESERVE_FLAG_IGNORE_JOBS: u64 = 0x0008;
pub const RESERVE_FLAG_ANY_NODES: u64 = 0x0010;
pub const RESERVE_FLAG_STATIC: u64 = 0x0020;
pub const RESERVE_FLAG_PART_NODES: u64 = 0x0040;
pub const RESERVE_FLAG_FLEX: u64 = 0x0080;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reservation {
    pub name: Option<String>,
    pub start_time: TriTime,
    pub end_time: TriTime,
    /// Minutes.
    pub duration: TriU32,
    /// `ReservationFlags` bitfield.
    pub flags: u64,
    pub node_list: Hostlist,
    pub core_count: TriU32,
    /// Reserved cores as a range list over the allocation.
    pub core_bitmap: Option<Bitmap>,
    pub users: Vec<String>,
    pub accounts: Vec<String>,
    pub partition: Option<String>,
}
