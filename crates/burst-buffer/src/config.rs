//! Plugin configuration.
//!
//! The configuration source is a whitespace-separated `Key=Value` line
//! set. User lists are resolved to uids at load time through the same
//! lookup trait the parser engine uses.

use crate::error::PluginError;
use std::path::PathBuf;
use std::time::Duration;
use wlm_data_parser::model::{NO_VAL64, SIZE_IN_NODES};
use wlm_data_parser::UserGroupLookup;

const DEFAULT_PROGRAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct BurstBufferConfig {
    /// Uids permitted to use burst buffers; empty = everyone not denied.
    pub allow_users: Vec<u32>,
    pub deny_users: Vec<u32>,
    /// Program queried for pool state and invoked for staging.
    pub get_sys_state: PathBuf,
    pub start_stage_in: Option<PathBuf>,
    pub start_stage_out: Option<PathBuf>,
    pub stop_stage_in: Option<PathBuf>,
    pub stop_stage_out: Option<PathBuf>,
    /// GB (or nodes when tagged); `NO_VAL64` = unlimited.
    pub job_size_limit: u64,
    pub user_size_limit: u64,
    /// Priority boost applied to jobs once staged in.
    pub prio_boost: u32,
    pub program_timeout: Duration,
}

impl Default for BurstBufferConfig {
    fn default() -> Self {
        Self {
            allow_users: Vec::new(),
            deny_users: Vec::new(),
            get_sys_state: PathBuf::new(),
            start_stage_in: None,
            start_stage_out: None,
            stop_stage_in: None,
            stop_stage_out: None,
            job_size_limit: NO_VAL64,
            user_size_limit: NO_VAL64,
            prio_boost: 0,
            program_timeout: DEFAULT_PROGRAM_TIMEOUT,
        }
    }
}

impl BurstBufferConfig {
    /// Parse `Key=Value` tokens, e.g.
    /// `AllowUsers=alice,bob GetSysState=/usr/sbin/bb_state JobSizeLimit=4T`.
    pub fn from_line(line: &str, users: &dyn UserGroupLookup) -> Result<Self, PluginError> {
        let mut config = Self::default();
        for token in line.split_whitespace() {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| PluginError::Config(format!("expected Key=Value, got {token:?}")))?;
            match key {
                "AllowUsers" => config.allow_users = resolve_users(value, users)?,
                "DenyUsers" => config.deny_users = resolve_users(value, users)?,
                "GetSysState" => config.get_sys_state = PathBuf::from(value),
                "StartStageIn" => config.start_stage_in = Some(PathBuf::from(value)),
                "StartStageOut" => config.start_stage_out = Some(PathBuf::from(value)),
                "StopStageIn" => config.stop_stage_in = Some(PathBuf::from(value)),
                "StopStageOut" => config.stop_stage_out = Some(PathBuf::from(value)),
                "JobSizeLimit" => config.job_size_limit = parse_size(value)?,
                "UserSizeLimit" => config.user_size_limit = parse_size(value)?,
                "PrioBoost" => {
                    config.prio_boost = value
                        .parse()
                        .map_err(|_| PluginError::Config(format!("bad PrioBoost {value:?}")))?
                }
                "ProgramTimeout" => {
                    let secs: u64 = value
                        .parse()
                        .map_err(|_| PluginError::Config(format!("bad ProgramTimeout {value:?}")))?;
                    config.program_timeout = Duration::from_secs(secs);
                }
                other => {
                    return Err(PluginError::Config(format!("unknown option {other:?}")));
                }
            }
        }
        if config.get_sys_state.as_os_str().is_empty() {
            return Err(PluginError::Config("GetSysState is required".into()));
        }
        if !config.allow_users.is_empty() && !config.deny_users.is_empty() {
            return Err(PluginError::Config(
                "AllowUsers and DenyUsers are mutually exclusive".into(),
            ));
        }
        Ok(config)
    }

    /// Permission check: deny list wins, then a non-empty allow list
    /// must contain the uid.
    pub fn user_permitted(&self, uid: u32) -> bool {
        if self.deny_users.contains(&uid) {
            return false;
        }
        self.allow_users.is_empty() || self.allow_users.contains(&uid)
    }
}

fn resolve_users(list: &str, users: &dyn UserGroupLookup) -> Result<Vec<u32>, PluginError> {
    let mut out = Vec::new();
    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match name.parse::<u32>() {
            Ok(uid) => out.push(uid),
            Err(_) => out.push(
                users
                    .uid_for_name(name)
                    .ok_or_else(|| PluginError::Config(format!("unknown user {name:?}")))?,
            ),
        }
    }
    Ok(out)
}

/// Size with M/G/T/P suffixes (canonical GB) or `N` for whole nodes.
pub(crate) fn parse_size(token: &str) -> Result<u64, PluginError> {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    let value: u64 = digits
        .parse()
        .map_err(|_| PluginError::Config(format!("bad size {token:?}")))?;
    match token[digits.len()..].trim().to_ascii_uppercase().as_str() {
        "" | "G" | "GB" => Ok(value),
        "M" | "MB" => Ok(value.div_ceil(1024)),
        "T" | "TB" => Ok(value * 1024),
        "P" | "PB" => Ok(value * 1024 * 1024),
        "N" | "NODES" => Ok(value | SIZE_IN_NODES),
        other => Err(PluginError::Config(format!("bad size suffix {other:?}"))),
    }
}
