//! Native controller data model targeted by the parser registry.
//!
//! Only the fields the REST surface exposes are carried; the structs are
//! plain owned data, zero-initialized via `Default` before parsing.

pub mod assoc;
pub mod bitmap;
pub mod burst;
pub mod hostlist;
pub mod job;
pub mod node;
pub mod partition;
pub mod qos;
pub mod reservation;
pub mod tres;
pub mod tri;

pub use assoc::{AssocShort, Association};
pub use bitmap::Bitmap;
pub use burst::{BurstBufferJobEntry, BurstBufferStatus};
pub use hostlist::Hostlist;
pub use job::{JobDescription, JobInfo};
pub use node::Node;
pub use partition::Partition;
pub use qos::Qos;
pub use reservation::Reservation;
pub use tres::Tres;
pub use tri::{Tri, TriBool, TriF64, TriI64, TriTime, TriU16, TriU32, TriU64};

// Width-specific reserved sentinels. `NO_VAL` means unset, `INFINITE`
// means unbounded; both sit at the top of the value range.
pub const NO_VAL16: u16 = 0xffff;
pub const INFINITE16: u16 = 0xfffe;
pub const NO_VAL: u32 = 0xffff_ffff;
pub const INFINITE: u32 = 0xffff_fffe;
pub const NO_VAL64: u64 = 0xffff_ffff_ffff_ffff;
pub const INFINITE64: u64 = 0xffff_ffff_ffff_fffe;

/// High bit of a memory request: set = per allocated CPU, clear = per node.
pub const MEM_PER_CPU: u64 = 0x8000_0000_0000_0000;

/// High bit of the specialized-core field: set = value counts threads.
pub const CORE_SPEC_THREAD: u16 = 0x8000;

/// Offset added to the signed wire nice value to store it unsigned.
pub const NICE_OFFSET: u32 = 0x8000_0000;

/// High bit of a burst buffer size: set = size counted in nodes, not GB.
pub const SIZE_IN_NODES: u64 = 0x8000_0000_0000_0000;
