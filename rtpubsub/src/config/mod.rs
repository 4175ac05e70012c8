//! Harness configuration loading.
//!
//! The command line carries the five run parameters; everything else comes
//! from an optional YAML file in which every key may be omitted:
//!
//! ```yaml
//! thread_policy: realtime      # realtime | pinned | unmanaged
//! loop_priority: 99
//! management_priority: 1
//! loop_cpu: 0
//! management_cpu: 1
//! wake_offset_ns: 0
//! start_value: 0
//! socket_priority: 7
//! type_of_service: 14
//! publisher_id: 1
//! writer_group_id: 1
//! dataset_writer_id: 1
//! log_file: publish.csv
//! observe_pacing: busy         # busy | cyclic (subscriber only)
//! ```
//!
//! Defaults depend on the [`Role`]: the two roles swap CPUs so a publisher
//! and a subscriber on the same host do not share a loop CPU.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::engine::frame::StreamId;
use crate::engine::udp::TransportOptions;
use crate::error::SetupError;
use crate::periodic::ObservePacing;
use crate::rt::{RtThreadConfig, ThreadPolicy};

/// Valid SCHED_FIFO priority range on Linux.
pub const FIFO_PRIORITY_RANGE: std::ops::RangeInclusive<i32> = 1..=99;

// ── Role ──────────────────────────────────────────────────────────────────────

/// Which loop variant a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Emit variant.
    Publisher,
    /// Observe variant.
    Subscriber,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Publisher => "publisher",
            Role::Subscriber => "subscriber",
        }
    }

    pub fn default_log_file(self) -> &'static str {
        match self {
            Role::Publisher => "publish.csv",
            Role::Subscriber => "subscribe.csv",
        }
    }

    /// `(loop_cpu, management_cpu)`
    fn default_cpus(self) -> (usize, usize) {
        match self {
            Role::Publisher => (0, 1),
            Role::Subscriber => (1, 0),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HarnessConfigFile {
    thread_policy: Option<ThreadPolicy>,
    loop_priority: Option<i32>,
    management_priority: Option<i32>,
    loop_cpu: Option<usize>,
    management_cpu: Option<usize>,
    wake_offset_ns: Option<u64>,
    start_value: Option<u64>,
    socket_priority: Option<u32>,
    type_of_service: Option<u8>,
    publisher_id: Option<u16>,
    writer_group_id: Option<u16>,
    dataset_writer_id: Option<u16>,
    log_file: Option<PathBuf>,
    observe_pacing: Option<ObservePacing>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Fully resolved harness configuration for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub role: Role,
    pub thread_policy: ThreadPolicy,
    pub loop_priority: i32,
    pub management_priority: i32,
    pub loop_cpu: usize,
    pub management_cpu: usize,
    /// Sub-cycle offset handed to the cyclic scheduler.
    pub wake_offset_ns: u64,
    /// Initial monitored value.
    pub start_value: u64,
    pub transport: TransportOptions,
    pub log_file: PathBuf,
    pub observe_pacing: ObservePacing,
}

impl HarnessConfig {
    /// Configuration used when no file is given.
    pub fn defaults(role: Role) -> Self {
        let (loop_cpu, management_cpu) = role.default_cpus();
        Self {
            role,
            thread_policy: ThreadPolicy::RealTime,
            loop_priority: 99,
            management_priority: 1,
            loop_cpu,
            management_cpu,
            wake_offset_ns: 0,
            start_value: 0,
            transport: TransportOptions::default(),
            log_file: PathBuf::from(role.default_log_file()),
            observe_pacing: ObservePacing::Busy,
        }
    }

    /// Resolve the configuration for `role`, reading `path` if given.
    ///
    /// # Errors
    /// [`SetupError::ConfigFile`] if the file cannot be read or parsed, and
    /// [`SetupError::InvalidConfig`] if the result fails [`validate`](Self::validate).
    pub fn load(path: Option<&Path>, role: Role) -> Result<Self, SetupError> {
        let config = match path {
            Some(path) => Self::load_from_file(path, role)?,
            None => Self::defaults(role),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse `path` on top of the role defaults, without validating.
    ///
    /// # Errors
    /// [`SetupError::ConfigFile`] if the file cannot be opened or the YAML is
    /// invalid or contains unknown keys.
    pub fn load_from_file(path: &Path, role: Role) -> Result<Self, SetupError> {
        info!("Loading harness configuration from: {}", path.display());

        let file_error = |reason: String| SetupError::ConfigFile {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        // An empty document deserialises as unit, not as an empty mapping.
        let file: HarnessConfigFile = if content.trim().is_empty() {
            HarnessConfigFile::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| file_error(e.to_string()))?
        };

        let base = Self::defaults(role);
        let config = Self {
            role,
            thread_policy: file.thread_policy.unwrap_or(base.thread_policy),
            loop_priority: file.loop_priority.unwrap_or(base.loop_priority),
            management_priority: file.management_priority.unwrap_or(base.management_priority),
            loop_cpu: file.loop_cpu.unwrap_or(base.loop_cpu),
            management_cpu: file.management_cpu.unwrap_or(base.management_cpu),
            wake_offset_ns: file.wake_offset_ns.unwrap_or(base.wake_offset_ns),
            start_value: file.start_value.unwrap_or(base.start_value),
            transport: TransportOptions {
                socket_priority: file
                    .socket_priority
                    .unwrap_or(base.transport.socket_priority),
                type_of_service: file
                    .type_of_service
                    .unwrap_or(base.transport.type_of_service),
                stream: StreamId {
                    publisher_id: file
                        .publisher_id
                        .unwrap_or(base.transport.stream.publisher_id),
                    writer_group_id: file
                        .writer_group_id
                        .unwrap_or(base.transport.stream.writer_group_id),
                    dataset_writer_id: file
                        .dataset_writer_id
                        .unwrap_or(base.transport.stream.dataset_writer_id),
                },
            },
            log_file: file.log_file.unwrap_or(base.log_file),
            observe_pacing: file.observe_pacing.unwrap_or(base.observe_pacing),
        };

        debug!("  Resolved configuration: {:?}", config);
        Ok(config)
    }

    /// Check the priority tiers and CPU placement.
    ///
    /// # Errors
    /// [`SetupError::InvalidConfig`] describing the first violation.
    pub fn validate(&self) -> Result<(), SetupError> {
        for (name, prio) in [
            ("loop_priority", self.loop_priority),
            ("management_priority", self.management_priority),
        ] {
            if !FIFO_PRIORITY_RANGE.contains(&prio) {
                return Err(SetupError::InvalidConfig(format!(
                    "{name} {prio} outside {}..={}",
                    FIFO_PRIORITY_RANGE.start(),
                    FIFO_PRIORITY_RANGE.end()
                )));
            }
        }
        if self.loop_priority <= self.management_priority {
            return Err(SetupError::InvalidConfig(format!(
                "loop_priority ({}) must be greater than management_priority ({})",
                self.loop_priority, self.management_priority
            )));
        }
        if self.thread_policy.pins_cpu() && self.loop_cpu == self.management_cpu {
            return Err(SetupError::InvalidConfig(format!(
                "loop_cpu and management_cpu must differ (both {})",
                self.loop_cpu
            )));
        }
        if self.thread_policy != ThreadPolicy::RealTime {
            warn!(
                policy = ?self.thread_policy,
                "threads are not running under SCHED_FIFO; timing results are indicative only"
            );
        }
        Ok(())
    }

    /// Thread parameters of the time-critical loop.
    pub fn loop_thread(&self) -> RtThreadConfig {
        RtThreadConfig {
            name: format!("{}-loop", self.role.as_str()),
            priority: self.loop_priority,
            cpu: self.loop_cpu,
            policy: self.thread_policy,
        }
    }

    /// Thread parameters of the management workload.
    pub fn management_thread(&self) -> RtThreadConfig {
        RtThreadConfig {
            name: format!("{}-mgmt", self.role.as_str()),
            priority: self.management_priority,
            cpu: self.management_cpu,
            policy: self.thread_policy,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn publisher_defaults() {
        let cfg = HarnessConfig::defaults(Role::Publisher);
        assert_eq!(cfg.thread_policy, ThreadPolicy::RealTime);
        assert_eq!((cfg.loop_priority, cfg.management_priority), (99, 1));
        assert_eq!((cfg.loop_cpu, cfg.management_cpu), (0, 1));
        assert_eq!(cfg.log_file, PathBuf::from("publish.csv"));
        assert_eq!(cfg.transport.socket_priority, 7);
        assert_eq!(cfg.transport.type_of_service, 0x0E);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn subscriber_defaults_swap_cpus_and_log_name() {
        let cfg = HarnessConfig::defaults(Role::Subscriber);
        assert_eq!((cfg.loop_cpu, cfg.management_cpu), (1, 0));
        assert_eq!(cfg.log_file, PathBuf::from("subscribe.csv"));
        assert_eq!(cfg.observe_pacing, ObservePacing::Busy);
    }

    #[test]
    fn no_file_means_defaults() {
        let cfg = HarnessConfig::load(None, Role::Publisher).unwrap();
        assert_eq!(cfg, HarnessConfig::defaults(Role::Publisher));
    }

    // ── load_from_file ────────────────────────────────────────────────────────

    #[test]
    fn full_file_overrides_every_key() {
        let yaml = r#"
thread_policy: pinned
loop_priority: 80
management_priority: 10
loop_cpu: 2
management_cpu: 3
wake_offset_ns: 250000
start_value: 1000
socket_priority: 3
type_of_service: 16
publisher_id: 2
writer_group_id: 100
dataset_writer_id: 62541
log_file: /tmp/run/sub.csv
observe_pacing: cyclic
"#;
        let f = yaml_tempfile(yaml);
        let cfg = HarnessConfig::load(Some(f.path()), Role::Subscriber).unwrap();

        assert_eq!(cfg.thread_policy, ThreadPolicy::Pinned);
        assert_eq!((cfg.loop_priority, cfg.management_priority), (80, 10));
        assert_eq!((cfg.loop_cpu, cfg.management_cpu), (2, 3));
        assert_eq!(cfg.wake_offset_ns, 250_000);
        assert_eq!(cfg.start_value, 1000);
        assert_eq!(cfg.transport.socket_priority, 3);
        assert_eq!(cfg.transport.type_of_service, 16);
        assert_eq!(
            cfg.transport.stream,
            StreamId {
                publisher_id: 2,
                writer_group_id: 100,
                dataset_writer_id: 62541,
            }
        );
        assert_eq!(cfg.log_file, PathBuf::from("/tmp/run/sub.csv"));
        assert_eq!(cfg.observe_pacing, ObservePacing::Cyclic);
    }

    #[test]
    fn partial_file_keeps_role_defaults() {
        let f = yaml_tempfile("start_value: 5\n");
        let cfg = HarnessConfig::load(Some(f.path()), Role::Subscriber).unwrap();
        assert_eq!(cfg.start_value, 5);
        assert_eq!((cfg.loop_cpu, cfg.management_cpu), (1, 0));
        assert_eq!(cfg.log_file, PathBuf::from("subscribe.csv"));
    }

    #[test]
    fn empty_file_is_accepted() {
        let f = yaml_tempfile("");
        let cfg = HarnessConfig::load(Some(f.path()), Role::Publisher).unwrap();
        assert_eq!(cfg, HarnessConfig::defaults(Role::Publisher));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let f = yaml_tempfile("loop_prio: 50\n");
        let err = HarnessConfig::load(Some(f.path()), Role::Publisher).unwrap_err();
        assert!(matches!(err, SetupError::ConfigFile { .. }));
    }

    #[test]
    fn missing_file_returns_error() {
        let err = HarnessConfig::load(Some(Path::new("/nonexistent/harness.yaml")), Role::Publisher)
            .unwrap_err();
        assert!(matches!(err, SetupError::ConfigFile { .. }));
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(HarnessConfig::load(Some(f.path()), Role::Publisher).is_err());
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn priority_out_of_range_is_rejected() {
        let mut cfg = HarnessConfig::defaults(Role::Publisher);
        cfg.loop_priority = 100;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("loop_priority 100"));
    }

    #[test]
    fn loop_must_outrank_management() {
        let mut cfg = HarnessConfig::defaults(Role::Publisher);
        cfg.management_priority = 99;
        assert!(matches!(cfg.validate(), Err(SetupError::InvalidConfig(_))));
    }

    #[test]
    fn shared_cpu_is_rejected_when_pinning() {
        let mut cfg = HarnessConfig::defaults(Role::Publisher);
        cfg.management_cpu = cfg.loop_cpu;
        assert!(cfg.validate().is_err());

        cfg.thread_policy = ThreadPolicy::Unmanaged;
        assert!(cfg.validate().is_ok());
    }

    // ── Thread plans ──────────────────────────────────────────────────────────

    #[test]
    fn thread_configs_carry_tiers_and_cpus() {
        let cfg = HarnessConfig::defaults(Role::Subscriber);
        let lp = cfg.loop_thread();
        let mg = cfg.management_thread();
        assert_eq!(lp.name, "subscriber-loop");
        assert_eq!((lp.priority, lp.cpu), (99, 1));
        assert_eq!(mg.name, "subscriber-mgmt");
        assert_eq!((mg.priority, mg.cpu), (1, 0));
        assert!(lp.priority > mg.priority);
    }
}
