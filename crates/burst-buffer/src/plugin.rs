//! Plugin lifecycle, space accounting, and the per-job stage state
//! machine.
//!
//! All mutable state lives in one map-pair behind a single mutex. User
//! space charges change only on stage-in start and stage-out
//! completion; a purge sweep drops allocations the external program
//! stopped reporting, at most once per minute.

use crate::config::BurstBufferConfig;
use crate::error::PluginError;
use crate::line;
use crate::program::StateProgram;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use wlm_data_parser::model::burst::*;
use wlm_data_parser::model::{NO_VAL64, SIZE_IN_NODES};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Result of one stage poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageProbe {
    InProgress,
    Complete,
    Fatal,
}

#[derive(Debug, Clone)]
struct BbAlloc {
    user_id: u32,
    /// GB, or node count when `SIZE_IN_NODES` is set.
    size: u64,
    state: u16,
    name: Option<String>,
    /// Cleared before each state refresh; entries the program stops
    /// reporting become purge candidates.
    seen: bool,
}

#[derive(Debug, Default)]
struct Pool {
    initialized: bool,
    total_space: u64,
    used_space: u64,
    user_usage: HashMap<u32, u64>,
    allocations: HashMap<u32, BbAlloc>,
    last_purge: Option<Instant>,
}

pub struct BurstBufferPlugin {
    config: BurstBufferConfig,
    program: Box<dyn StateProgram>,
    pool: Mutex<Pool>,
}

/// Space charge of one allocation; node-tagged sizes do not consume GB.
fn charged(size: u64) -> u64 {
    if size & SIZE_IN_NODES != 0 {
        0
    } else {
        size
    }
}

impl BurstBufferPlugin {
    pub fn new(config: BurstBufferConfig, program: Box<dyn StateProgram>) -> Self {
        Self {
            config,
            program,
            pool: Mutex::new(Pool::default()),
        }
    }

    pub fn init(&self) {
        let mut pool = self.pool.lock().expect("burst buffer mutex poisoned");
        pool.initialized = true;
        tracing::info!("burst buffer plugin initialized");
    }

    pub fn fini(&self) {
        let mut pool = self.pool.lock().expect("burst buffer mutex poisoned");
        pool.initialized = false;
        pool.allocations.clear();
        pool.user_usage.clear();
        pool.used_space = 0;
        tracing::info!("burst buffer plugin finalized");
    }

    /// Register a new allocation and begin staging data in. The user's
    /// space charge is taken here, not at completion.
    pub fn start_stage_in(&self, job_id: u32, user_id: u32, size: u64) -> Result<(), PluginError> {
        let mut pool = self.pool.lock().expect("burst buffer mutex poisoned");
        if !pool.initialized {
            return Err(PluginError::NotInitialized);
        }
        if !self.config.user_permitted(user_id) {
            return Err(PluginError::UserNotPermitted(user_id));
        }
        if self.config.job_size_limit != NO_VAL64 && charged(size) > self.config.job_size_limit {
            return Err(PluginError::SizeLimit {
                requested: charged(size),
                limit: self.config.job_size_limit,
                limit_kind: "job",
            });
        }
        let user_used = pool.user_usage.get(&user_id).copied().unwrap_or(0);
        if self.config.user_size_limit != NO_VAL64
            && user_used + charged(size) > self.config.user_size_limit
        {
            return Err(PluginError::SizeLimit {
                requested: user_used + charged(size),
                limit: self.config.user_size_limit,
                limit_kind: "user",
            });
        }
        let available = pool.total_space.saturating_sub(pool.used_space);
        if charged(size) > available {
            return Err(PluginError::NoSpace {
                requested: charged(size),
                available,
            });
        }

        pool.used_space += charged(size);
        *pool.user_usage.entry(user_id).or_insert(0) += charged(size);
        pool.allocations.insert(
            job_id,
            BbAlloc {
                user_id,
                size,
                state: BB_STATE_STAGING_IN,
                name: None,
                seen: true,
            },
        );
        tracing::debug!(job_id, user_id, size, "stage-in started");
        Ok(())
    }

    /// Poll stage-in progress for the scheduler tick.
    pub fn test_stage_in(&self, job_id: u32) -> StageProbe {
        let pool = self.pool.lock().expect("burst buffer mutex poisoned");
        match pool.allocations.get(&job_id).map(|a| a.state) {
            Some(BB_STATE_STAGING_IN) => StageProbe::InProgress,
            Some(BB_STATE_STAGED_IN | BB_STATE_RUNNING) => StageProbe::Complete,
            Some(_) | None => StageProbe::Fatal,
        }
    }

    /// Mark the job as running; called when the scheduler launches it.
    pub fn job_begin(&self, job_id: u32) -> Result<(), PluginError> {
        let mut pool = self.pool.lock().expect("burst buffer mutex poisoned");
        let alloc = pool
            .allocations
            .get_mut(&job_id)
            .ok_or(PluginError::UnknownJob(job_id))?;
        alloc.state = BB_STATE_RUNNING;
        Ok(())
    }

    pub fn start_stage_out(&self, job_id: u32) -> Result<(), PluginError> {
        let mut pool = self.pool.lock().expect("burst buffer mutex poisoned");
        let alloc = pool
            .allocations
            .get_mut(&job_id)
            .ok_or(PluginError::UnknownJob(job_id))?;
        alloc.state = BB_STATE_STAGING_OUT;
        tracing::debug!(job_id, "stage-out started");
        Ok(())
    }

    /// Poll stage-out progress; completion releases the space charge.
    pub fn test_stage_out(&self, job_id: u32) -> StageProbe {
        let mut pool = self.pool.lock().expect("burst buffer mutex poisoned");
        let Some(alloc) = pool.allocations.get(&job_id).cloned() else {
            return StageProbe::Fatal;
        };
        match alloc.state {
            BB_STATE_STAGING_OUT => StageProbe::InProgress,
            BB_STATE_STAGED_OUT => {
                release(&mut pool, job_id, &alloc);
                StageProbe::Complete
            }
            _ => StageProbe::Fatal,
        }
    }

    /// Refresh pool state from the external program. On program failure
    /// or a rejected report the totals are left untouched.
    pub async fn load_state(&self) -> Result<(), PluginError> {
        {
            let pool = self.pool.lock().expect("burst buffer mutex poisoned");
            if !pool.initialized {
                return Err(PluginError::NotInitialized);
            }
        }
        let output = self.program.run("get_sys_state").await?;
        let status = line::parse_report(&output.stdout)?;

        let mut pool = self.pool.lock().expect("burst buffer mutex poisoned");
        pool.total_space = status.total_size & !SIZE_IN_NODES;
        for alloc in pool.allocations.values_mut() {
            alloc.seen = false;
        }
        for entry in &status.allocations {
            match pool.allocations.get_mut(&entry.job_id) {
                Some(alloc) => {
                    // The program owns state advancement between the
                    // controller-driven transitions.
                    alloc.state = entry.state;
                    alloc.name = entry.name.clone();
                    alloc.seen = true;
                }
                None => {
                    pool.allocations.insert(
                        entry.job_id,
                        BbAlloc {
                            user_id: entry.user_id,
                            size: entry.size,
                            state: entry.state,
                            name: entry.name.clone(),
                            seen: true,
                        },
                    );
                    pool.used_space += charged(entry.size);
                    *pool.user_usage.entry(entry.user_id).or_insert(0) += charged(entry.size);
                }
            }
        }
        maybe_purge(&mut pool);
        Ok(())
    }

    /// Snapshot for status endpoints: (total, used, live allocations).
    pub fn usage(&self) -> (u64, u64, usize) {
        let pool = self.pool.lock().expect("burst buffer mutex poisoned");
        (pool.total_space, pool.used_space, pool.allocations.len())
    }

    pub fn user_usage(&self, user_id: u32) -> u64 {
        let pool = self.pool.lock().expect("burst buffer mutex poisoned");
        pool.user_usage.get(&user_id).copied().unwrap_or(0)
    }

    pub fn job_state(&self, job_id: u32) -> Option<u16> {
        let pool = self.pool.lock().expect("burst buffer mutex poisoned");
        pool.allocations.get(&job_id).map(|a| a.state)
    }
}

fn release(pool: &mut Pool, job_id: u32, alloc: &BbAlloc) {
    pool.used_space = pool.used_space.saturating_sub(charged(alloc.size));
    if let Some(usage) = pool.user_usage.get_mut(&alloc.user_id) {
        *usage = usage.saturating_sub(charged(alloc.size));
    }
    pool.allocations.remove(&job_id);
    tracing::debug!(job_id, "stage-out complete, space released");
}

/// Drop allocations the program stopped reporting. Runs from the same
/// locked path as the refresh, at most once per minute.
fn maybe_purge(pool: &mut Pool) {
    let now = Instant::now();
    if let Some(last) = pool.last_purge {
        if now.duration_since(last) < PURGE_INTERVAL {
            return;
        }
    }
    pool.last_purge = Some(now);
    let stale: Vec<u32> = pool
        .allocations
        .iter()
        .filter(|(_, a)| !a.seen)
        .map(|(job_id, _)| *job_id)
        .collect();
    for job_id in stale {
        if let Some(alloc) = pool.allocations.get(&job_id).cloned() {
            tracing::warn!(job_id, "purging unreported burst buffer allocation");
            release(pool, job_id, &alloc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramOutput;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct CannedProgram {
        replies: StdMutex<Vec<Result<&'static str, PluginError>>>,
    }

    impl CannedProgram {
        fn new(replies: Vec<Result<&'static str, PluginError>>) -> Box<Self> {
            Box::new(Self {
                replies: StdMutex::new(replies),
            })
        }
    }

    #[async_trait]
    impl StateProgram for CannedProgram {
        async fn run(&self, _subcommand: &str) -> Result<ProgramOutput, PluginError> {
            match self.replies.lock().unwrap().remove(0) {
                Ok(stdout) => Ok(ProgramOutput {
                    stdout: stdout.to_string(),
                }),
                Err(err) => Err(err),
            }
        }
    }

    fn plugin_with(replies: Vec<Result<&'static str, PluginError>>) -> BurstBufferPlugin {
        let config = BurstBufferConfig {
            get_sys_state: "/usr/sbin/bb_state".into(),
            job_size_limit: 100,
            user_size_limit: 150,
            ..Default::default()
        };
        let plugin = BurstBufferPlugin::new(config, CannedProgram::new(replies));
        plugin.init();
        plugin
    }

    #[tokio::test]
    async fn test_load_state_updates_totals() {
        let plugin = plugin_with(vec![Ok("TotalSize=1000\nUserID=1000 JobID=17 Size=4G State=STAGING_IN\n")]);
        plugin.load_state().await.unwrap();
        assert_eq!(plugin.usage(), (1000, 4, 1));
        assert_eq!(plugin.user_usage(1000), 4);
        assert_eq!(plugin.job_state(17), Some(BB_STATE_STAGING_IN));
    }

    #[tokio::test]
    async fn test_program_failure_leaves_totals() {
        let plugin = plugin_with(vec![
            Ok("TotalSize=1000\n"),
            Err(PluginError::ProgramTimeout {
                program: "bb_state".into(),
                timeout_secs: 30,
            }),
        ]);
        plugin.load_state().await.unwrap();
        assert_eq!(plugin.usage(), (1000, 0, 0));
        assert!(plugin.load_state().await.is_err());
        assert_eq!(plugin.usage(), (1000, 0, 0));
    }

    #[tokio::test]
    async fn test_stage_lifecycle() {
        let plugin = plugin_with(vec![
            Ok("TotalSize=1000\n"),
            Ok("TotalSize=1000\nUserID=1000 JobID=7 Size=10 State=STAGED_IN\n"),
            Ok("TotalSize=1000\nUserID=1000 JobID=7 Size=10 State=STAGED_OUT\n"),
        ]);
        plugin.load_state().await.unwrap();

        plugin.start_stage_in(7, 1000, 10).unwrap();
        assert_eq!(plugin.test_stage_in(7), StageProbe::InProgress);
        assert_eq!(plugin.user_usage(1000), 10);

        // The program reports stage-in completion.
        plugin.load_state().await.unwrap();
        assert_eq!(plugin.test_stage_in(7), StageProbe::Complete);

        plugin.job_begin(7).unwrap();
        assert_eq!(plugin.job_state(7), Some(BB_STATE_RUNNING));

        plugin.start_stage_out(7).unwrap();
        assert_eq!(plugin.test_stage_out(7), StageProbe::InProgress);

        // The program reports stage-out completion; the poll releases
        // the user's space.
        plugin.load_state().await.unwrap();
        assert_eq!(plugin.test_stage_out(7), StageProbe::Complete);
        assert_eq!(plugin.user_usage(1000), 0);
        assert_eq!(plugin.usage().2, 0);
        assert_eq!(plugin.test_stage_out(7), StageProbe::Fatal);
    }

    #[tokio::test]
    async fn test_limits_enforced() {
        let plugin = plugin_with(vec![Ok("TotalSize=120\n")]);
        plugin.load_state().await.unwrap();

        let err = plugin.start_stage_in(1, 1000, 200).unwrap_err();
        assert!(matches!(
            err,
            PluginError::SizeLimit {
                limit_kind: "job",
                ..
            }
        ));

        plugin.start_stage_in(1, 1000, 90).unwrap();
        let err = plugin.start_stage_in(2, 1000, 70).unwrap_err();
        assert!(matches!(
            err,
            PluginError::SizeLimit {
                limit_kind: "user",
                ..
            }
        ));

        // A different user hits the pool capacity instead.
        let err = plugin.start_stage_in(3, 2000, 40).unwrap_err();
        assert!(matches!(err, PluginError::NoSpace { .. }));
    }

    #[tokio::test]
    async fn test_denied_user_rejected() {
        let config = BurstBufferConfig {
            get_sys_state: "/usr/sbin/bb_state".into(),
            deny_users: vec![1001],
            ..Default::default()
        };
        let plugin = BurstBufferPlugin::new(config, CannedProgram::new(vec![Ok("TotalSize=10\n")]));
        plugin.init();
        plugin.load_state().await.unwrap();
        let err = plugin.start_stage_in(1, 1001, 1).unwrap_err();
        assert!(matches!(err, PluginError::UserNotPermitted(1001)));
    }

    #[tokio::test]
    async fn test_uninitialized_rejected() {
        let plugin = BurstBufferPlugin::new(
            BurstBufferConfig {
                get_sys_state: "/usr/sbin/bb_state".into(),
                ..Default::default()
            },
            CannedProgram::new(vec![]),
        );
        assert!(matches!(
            plugin.start_stage_in(1, 1, 1),
            Err(PluginError::NotInitialized)
        ));
        assert!(matches!(
            plugin.load_state().await,
            Err(PluginError::NotInitialized)
        ));
    }
}
