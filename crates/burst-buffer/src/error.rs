//! Plugin error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("bad configuration: {0}")]
    Config(String),

    #[error("plugin is not initialized")]
    NotInitialized,

    #[error("user {0} is not permitted to use burst buffers")]
    UserNotPermitted(u32),

    #[error("requested size {requested} exceeds {limit_kind} limit {limit}")]
    SizeLimit {
        requested: u64,
        limit: u64,
        limit_kind: &'static str,
    },

    #[error("insufficient buffer space: {requested} requested, {available} free")]
    NoSpace { requested: u64, available: u64 },

    #[error("no burst buffer allocation for job {0}")]
    UnknownJob(u32),

    #[error("{program} exited with status {status}")]
    ProgramFailed { program: String, status: i32 },

    #[error("{program} did not respond within {timeout_secs}s")]
    ProgramTimeout { program: String, timeout_secs: u64 },

    #[error("failed to spawn {program}: {source}")]
    ProgramSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state report rejected: {0}")]
    BadStateReport(String),
}
