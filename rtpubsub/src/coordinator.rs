/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Lifecycle coordinator: starts, awaits and tears down the two harness
//! threads.
//!
//! ```text
//!  main ──► spawn management (low prio, cpu A) ──► spawn periodic loop (high prio, cpu B)
//!             │ EngineServer::serve(running)           │ PeriodicLoop::run()
//!             │                                        │ ... clears `running` on completion
//!  main ◄──── join loop ◄──────────────────────────────┘
//!  main ◄──── join management ◄── serve() returns once `running` is false
//! ```
//!
//! Engine setup happens before [`run`] is called; nothing here touches the
//! engine beyond handing its server to the management thread.

use tracing::{error, info};

use crate::config::HarnessConfig;
use crate::engine::EngineServer;
use crate::error::{EngineError, HarnessError};
use crate::periodic::{CycleBody, LoopOutput, PeriodicLoop};
use crate::rt::{self, RtThreadConfig};
use crate::shared::RunningFlag;

/// Execution contexts of the two harness threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPlan {
    pub periodic: RtThreadConfig,
    pub management: RtThreadConfig,
}

impl From<&HarnessConfig> for ThreadPlan {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            periodic: config.loop_thread(),
            management: config.management_thread(),
        }
    }
}

/// Result of a run that got as far as joining both threads.
#[derive(Debug)]
pub struct RunOutcome {
    pub output: LoopOutput,
    /// Completion status reported by the management thread.
    pub management: Result<(), EngineError>,
}

impl RunOutcome {
    /// A run is successful only if the management thread completed cleanly.
    pub fn is_success(&self) -> bool {
        self.management.is_ok()
    }
}

/// Run `body` for up to `sample_count` samples alongside `server`.
///
/// The measurement buffer is allocated before either thread starts.  The
/// periodic loop is joined first; its completion clears `running`, which in
/// turn ends the management thread.
///
/// # Errors
/// * [`HarnessError::Setup`] if the buffer cannot be allocated (no thread is
///   started) or either thread cannot be configured.  If the
///   loop thread fails, the already running management thread is stopped and
///   joined first.
/// * [`HarnessError::Scheduling`] if the loop hit a scheduler failure.
/// * [`HarnessError::ThreadPanicked`] if either thread panicked.
pub fn run<S, B>(
    server: S,
    body: B,
    running: RunningFlag,
    sample_count: usize,
    plan: &ThreadPlan,
) -> Result<RunOutcome, HarnessError>
where
    S: EngineServer,
    B: CycleBody,
{
    let periodic = PeriodicLoop::new(body, running.clone(), sample_count)?;

    let management_flag = running.clone();
    let management = rt::spawn(&plan.management, move || server.serve(&management_flag))?;
    info!(
        thread   = management.name(),
        priority = plan.management.priority,
        cpu      = plan.management.cpu,
        "management thread started"
    );

    let periodic = match rt::spawn(&plan.periodic, move || periodic.run()) {
        Ok(handle) => handle,
        Err(e) => {
            running.stop();
            let _ = management.join();
            return Err(e.into());
        }
    };
    info!(
        thread   = periodic.name(),
        priority = plan.periodic.priority,
        cpu      = plan.periodic.cpu,
        "periodic thread started"
    );

    let loop_result = periodic.join();
    // A panicked loop never cleared the flag itself.
    running.stop();
    let management = management.join()?;

    let output = loop_result??;
    match &management {
        Ok(()) => info!("management thread completed"),
        Err(e) => error!("management thread failed: {}", e),
    }
    Ok(RunOutcome { output, management })
}
