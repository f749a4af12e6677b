//! Protocol versions driving field deprecation and removal.
//!
//! A version is packed as `(major << 8) | minor` so ordering comparisons
//! work directly on the wrapped integer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller protocol version, e.g. `24.05`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolVersion(u16);

impl ProtocolVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self(((major as u16) << 8) | minor as u16)
    }

    pub const V23_02: ProtocolVersion = ProtocolVersion::new(23, 2);
    pub const V23_11: ProtocolVersion = ProtocolVersion::new(23, 11);
    pub const V24_05: ProtocolVersion = ProtocolVersion::new(24, 5);

    /// Version spoken by this build.
    pub const CURRENT: ProtocolVersion = ProtocolVersion::V24_05;

    /// Oldest dialect still accepted from callers.
    pub const MIN_SUPPORTED: ProtocolVersion = ProtocolVersion::V23_02;

    pub const fn major(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn minor(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major(), self.minor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        assert!(ProtocolVersion::V23_02 < ProtocolVersion::V23_11);
        assert!(ProtocolVersion::V23_11 < ProtocolVersion::V24_05);
        assert_eq!(ProtocolVersion::CURRENT, ProtocolVersion::V24_05);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(ProtocolVersion::V24_05.to_string(), "24.05");
        assert_eq!(ProtocolVersion::V23_02.to_string(), "23.02");
    }
}
