/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The time-critical periodic loop.
//!
//! [`PeriodicLoop`] owns the shared state machine; the per-iteration body is
//! supplied by one of the two variants:
//!
//! | Variant | Body | Samples |
//! |---|---|---|
//! | emit ([`EmitCycle`]) | increment → stage → wait → timestamp → commit → publish | one per cycle |
//! | observe ([`ObserveCycle`]) | read → subscribe → timestamp → re-read → record if changed | only on new values |
//!
//! # State machine
//! ```text
//!  Running ──(flag false at loop-top | count reached)──► Terminating ──► Terminated
//! ```
//! The flag is only consulted at loop-top, so the sample whose commit
//! reaches the target count is always recorded before other threads can
//! observe the flag transition.

pub mod emit;
pub mod observe;

pub use emit::EmitCycle;
pub use observe::{ObserveCycle, ObservePacing};

use tracing::{debug, info};

use crate::error::{SchedulingError, SetupError};
use crate::measurement::MeasurementBuffer;
use crate::shared::RunningFlag;

// ── CycleBody ─────────────────────────────────────────────────────────────────

/// What one iteration of a loop body did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    /// A sample was appended to the buffer.
    pub recorded: bool,
    /// The messaging-engine step reported success.
    pub step_ok: bool,
}

/// One variant of the per-iteration body.
pub trait CycleBody: Send + 'static {
    /// Short name used in log events (`"emit"` / `"observe"`).
    fn variant(&self) -> &'static str;

    /// Run one iteration, appending at most one sample to `buffer`.
    ///
    /// # Errors
    /// Any [`SchedulingError`]; the loop stops immediately.
    fn cycle(&mut self, buffer: &mut MeasurementBuffer) -> Result<CycleOutcome, SchedulingError>;
}

// ── Loop state ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminating,
    Terminated,
}

/// Counters collected while the loop ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopReport {
    /// Loop bodies executed.
    pub iterations: u64,
    /// Samples appended to the buffer.
    pub samples: usize,
    /// Messaging-engine steps that returned an error.
    pub step_failures: u64,
}

/// Everything the loop hands back to the coordinator.
#[derive(Debug)]
pub struct LoopOutput {
    pub buffer: MeasurementBuffer,
    pub report: LoopReport,
}

// ── PeriodicLoop ──────────────────────────────────────────────────────────────

pub struct PeriodicLoop<B: CycleBody> {
    body: B,
    running: RunningFlag,
    buffer: MeasurementBuffer,
    state: LoopState,
    report: LoopReport,
}

impl<B: CycleBody> PeriodicLoop<B> {
    /// Prepare a loop that records up to `sample_count` samples.
    ///
    /// The buffer is allocated here, before the loop thread starts.
    ///
    /// # Errors
    /// [`SetupError::Allocation`] if `sample_count` samples cannot be reserved.
    pub fn new(body: B, running: RunningFlag, sample_count: usize) -> Result<Self, SetupError> {
        Ok(Self {
            body,
            running,
            buffer: MeasurementBuffer::with_capacity(sample_count)?,
            state: LoopState::Running,
            report: LoopReport::default(),
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run until terminated and return the filled buffer.
    ///
    /// # Errors
    /// The first [`SchedulingError`] raised by the body.  The running flag is
    /// cleared before returning so the management thread winds down too.
    pub fn run(mut self) -> Result<LoopOutput, SchedulingError> {
        debug!(
            variant = self.body.variant(),
            capacity = self.buffer.capacity(),
            "periodic loop entered"
        );

        while self.state != LoopState::Terminated {
            self.state = match self.state {
                LoopState::Running => match self.iterate() {
                    Ok(next) => next,
                    Err(e) => {
                        self.running.stop();
                        return Err(e);
                    }
                },
                LoopState::Terminating => LoopState::Terminated,
                LoopState::Terminated => LoopState::Terminated,
            };
        }

        info!(
            variant       = self.body.variant(),
            iterations    = self.report.iterations,
            samples       = self.report.samples,
            step_failures = self.report.step_failures,
            "periodic loop terminated"
        );

        Ok(LoopOutput {
            buffer: self.buffer,
            report: self.report,
        })
    }

    fn iterate(&mut self) -> Result<LoopState, SchedulingError> {
        if !self.running.is_running() {
            return Ok(LoopState::Terminating);
        }
        // Only reachable here for a sample count of zero.
        if self.buffer.is_full() {
            self.running.stop();
            return Ok(LoopState::Terminating);
        }

        let outcome = self.body.cycle(&mut self.buffer)?;
        self.report.iterations += 1;
        if outcome.recorded {
            self.report.samples += 1;
        }
        if !outcome.step_ok {
            self.report.step_failures += 1;
        }

        if self.buffer.is_full() {
            self.running.stop();
            return Ok(LoopState::Terminating);
        }
        Ok(LoopState::Running)
    }
}
