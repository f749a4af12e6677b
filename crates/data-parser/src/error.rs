//! Closed parse/dump error taxonomy.
//!
//! Every error a codec or engine can surface to a REST caller is one of
//! these variants; the wire-visible name is stable and drawn from a closed
//! table. Errors are recoverable at field granularity: the engines record
//! them and continue so a single request reports every bad field.

use crate::version::ProtocolVersion;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ParseError {
    /// A leaf value could not be coerced to the declared type.
    #[error("cannot convert {found} to {expected}")]
    ConvFailed {
        expected: &'static str,
        found: &'static str,
    },

    /// Structural mismatch: a list was required.
    #[error("expected list, found {found}")]
    ExpectedList { found: &'static str },

    /// Structural mismatch: a dict was required.
    #[error("expected dict, found {found}")]
    ExpectedDict { found: &'static str },

    /// Value outside the declared range.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Referenced type id has no registered descriptor.
    #[error("parser type {0} is not registered")]
    UnknownType(&'static str),

    /// Prerequisite resolver missing, or the codec is disabled.
    #[error("not supported: {0}")]
    NotSupported(&'static str),

    /// QoS name or id resolves to no known QoS.
    #[error("unknown QOS {0:?}")]
    InvalidQos(String),

    /// Association lookup matched nothing.
    #[error("unknown association {0:?}")]
    InvalidAssoc(String),

    /// TRES name or id resolves to no trackable resource.
    #[error("unknown TRES {0:?}")]
    InvalidTres(String),

    #[error("unknown user {0:?}")]
    UserIdUnknown(String),

    #[error("unknown group {0:?}")]
    GroupIdUnknown(String),

    /// Nice value outside the encodable offset range.
    #[error("nice value {0} out of range")]
    InvalidNice(i64),

    /// Specialized core count outside the encodable range.
    #[error("core specification {0} out of range")]
    InvalidCoreCount(u64),

    /// Task memory request could not be encoded.
    #[error("invalid task memory: {0}")]
    InvalidTaskMemory(String),

    /// Specialized thread count outside the encodable range.
    #[error("thread specification {0} out of range")]
    BadThreadPerCore(u64),

    /// A field was rejected because the caller's declared protocol
    /// version predates its removal.
    #[error("field {key} was removed in {since}")]
    RemovedField {
        key: String,
        since: ProtocolVersion,
    },

    /// Registry vtable handed a native value of the wrong concrete type.
    /// Indicates a descriptor-table bug, caught by the startup self-check.
    #[error("native value is not a {0}")]
    NativeMismatch(&'static str),
}

impl ParseError {
    /// Stable wire-visible name.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ParseError::ConvFailed { .. } => "DATA_CONV_FAILED",
            ParseError::ExpectedList { .. } => "DATA_EXPECTED_LIST",
            ParseError::ExpectedDict { .. } => "DATA_EXPECTED_DICT",
            ParseError::InvalidValue(_) => "INVALID_VALUE",
            ParseError::UnknownType(_) => "UNKNOWN_TYPE",
            ParseError::NotSupported(_) => "NOT_SUPPORTED",
            ParseError::InvalidQos(_) => "INVALID_QOS",
            ParseError::InvalidAssoc(_) => "INVALID_ASSOC",
            ParseError::InvalidTres(_) => "INVALID_TRES",
            ParseError::UserIdUnknown(_) => "USER_ID_UNKNOWN",
            ParseError::GroupIdUnknown(_) => "GROUP_ID_UNKNOWN",
            ParseError::InvalidNice(_) => "INVALID_NICE",
            ParseError::InvalidCoreCount(_) => "INVALID_CORE_CNT",
            ParseError::InvalidTaskMemory(_) => "INVALID_TASK_MEMORY",
            ParseError::BadThreadPerCore(_) => "BAD_THREAD_PER_CORE",
            ParseError::RemovedField { .. } => "REMOVED_FIELD",
            ParseError::NativeMismatch(_) => "NATIVE_MISMATCH",
        }
    }

    /// Structural errors abort the enclosing subtree instead of being
    /// skipped field-by-field.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ParseError::ExpectedList { .. } | ParseError::ExpectedDict { .. }
        )
    }

    pub(crate) fn conv(expected: &'static str, found: &serde_json::Value) -> Self {
        ParseError::ConvFailed {
            expected,
            found: crate::tree::type_name(found),
        }
    }
}
