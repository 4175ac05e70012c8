/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Real-time worker threads.
//!
//! [`spawn`] creates a thread that configures its own execution context
//! (single-CPU affinity, then SCHED_FIFO priority) **before** the routine runs, and
//! reports the outcome back to the caller over a rendezvous channel.  The
//! caller only gets an [`RtThread`] handle once configuration succeeded; any
//! failing step is returned as [`SetupError::ThreadConfig`] and the routine is
//! never executed.
//!
//! # Policies
//!
//! | [`ThreadPolicy`] | SCHED_FIFO | CPU pinning | Intended use |
//! |---|---|---|---|
//! | `RealTime` | ✓ | ✓ | measurement runs (needs `CAP_SYS_NICE`) |
//! | `Pinned` | – | ✓ | unprivileged hosts |
//! | `Unmanaged` | – | – | development and tests only |
//!
//! Scheduling is always set explicitly on the new thread; nothing is
//! inherited from the spawning thread.

#[cfg(target_os = "linux")]
mod linux;

use std::io;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use serde::Deserialize;
use tracing::debug;

use crate::error::{HarnessError, SetupError};

// ── Configuration ─────────────────────────────────────────────────────────────

/// How much of the real-time context a thread gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadPolicy {
    /// Fixed-priority FIFO scheduling and single-CPU affinity.
    #[default]
    RealTime,
    /// Single-CPU affinity only; default time-sharing policy.
    Pinned,
    /// No configuration at all.  Timing results are not meaningful.
    Unmanaged,
}

impl ThreadPolicy {
    /// Returns `true` if threads under this policy are pinned to one CPU.
    pub fn pins_cpu(self) -> bool {
        matches!(self, ThreadPolicy::RealTime | ThreadPolicy::Pinned)
    }
}

/// Parameters for one real-time worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtThreadConfig {
    /// Thread name (truncated by the kernel to 15 bytes).
    pub name: String,
    /// SCHED_FIFO priority; ignored unless `policy` is `RealTime`.
    pub priority: i32,
    /// CPU index the thread is pinned to; ignored under `Unmanaged`.
    pub cpu: usize,
    pub policy: ThreadPolicy,
}

// ── RtThread ──────────────────────────────────────────────────────────────────

/// Handle to a configured worker.  Must be joined before process exit.
#[derive(Debug)]
pub struct RtThread<T> {
    name: String,
    handle: JoinHandle<Option<T>>,
}

impl<T> RtThread<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the routine to return and hand back its result.
    ///
    /// # Errors
    /// [`HarnessError::ThreadPanicked`] if the routine panicked.
    pub fn join(self) -> Result<T, HarnessError> {
        match self.handle.join() {
            Ok(Some(value)) => Ok(value),
            _ => Err(HarnessError::ThreadPanicked(self.name)),
        }
    }
}

// ── spawn ─────────────────────────────────────────────────────────────────────

/// Create a worker running `routine` under `config`.
///
/// Blocks until the new thread has applied (or failed to apply) its
/// configuration.
///
/// # Errors
/// [`SetupError::ThreadConfig`] naming the failing step, or
/// [`SetupError::Unsupported`] on platforms without the required primitives.
pub fn spawn<F, T>(config: &RtThreadConfig, routine: F) -> Result<RtThread<T>, SetupError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (ack_tx, ack_rx) = mpsc::sync_channel::<Result<(), SetupError>>(1);
    let thread_config = config.clone();

    let handle = thread::Builder::new()
        .name(config.name.clone())
        .spawn(move || {
            let configured = configure_current_thread(&thread_config);
            let ok = configured.is_ok();
            // The receiver only disappears if the spawner itself died.
            let _ = ack_tx.send(configured);
            if ok {
                Some(routine())
            } else {
                None
            }
        })
        .map_err(|source| SetupError::ThreadConfig {
            thread: config.name.clone(),
            step: "thread creation",
            source,
        })?;

    match ack_rx.recv() {
        Ok(Ok(())) => {
            debug!(
                thread   = %config.name,
                policy   = ?config.policy,
                priority = config.priority,
                cpu      = config.cpu,
                "worker configured"
            );
            Ok(RtThread {
                name: config.name.clone(),
                handle,
            })
        }
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(SetupError::ThreadConfig {
                thread: config.name.clone(),
                step: "configuration handshake",
                source: io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "thread exited before reporting its configuration",
                ),
            })
        }
    }
}

#[cfg(target_os = "linux")]
fn configure_current_thread(config: &RtThreadConfig) -> Result<(), SetupError> {
    match config.policy {
        ThreadPolicy::Unmanaged => Ok(()),
        ThreadPolicy::Pinned => linux::pin_current_thread(&config.name, config.cpu),
        // Pin before raising the priority: never run FIFO on a foreign CPU.
        ThreadPolicy::RealTime => {
            linux::pin_current_thread(&config.name, config.cpu)?;
            linux::set_current_thread_fifo(&config.name, config.priority)
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn configure_current_thread(config: &RtThreadConfig) -> Result<(), SetupError> {
    match config.policy {
        ThreadPolicy::Unmanaged => Ok(()),
        _ => Err(SetupError::Unsupported(
            "SCHED_FIFO and CPU pinning are only implemented for Linux",
        )),
    }
}
