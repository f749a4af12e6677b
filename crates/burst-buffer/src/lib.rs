//! wlm-burst-buffer: generic burst buffer plugin.
//!
//! Orchestrates stage-in/out of job data through a site-provided
//! external program and accounts buffer space per user. The program's
//! line-oriented status output is converted to a value tree and fed
//! through the shared data-parser engine rather than a private parser.

pub mod config;
pub mod error;
pub mod line;
pub mod plugin;
pub mod program;

pub use config::BurstBufferConfig;
pub use error::PluginError;
pub use plugin::{BurstBufferPlugin, StageProbe};
pub use program::{ExternalProgram, ProgramOutput, StateProgram};
