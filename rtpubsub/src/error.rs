/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the rtpubsub harness.
//!
//! The harness has no local recovery tier: every error below ends the run
//! with a failure exit status.  The variants are still kept distinct so each
//! failure class can be matched and tested on its own:
//!
//! | Enum | Raised by | Examples |
//! |---|---|---|
//! | [`SetupError`] | startup, before either thread runs | bad config, socket option, thread configuration, buffer allocation |
//! | [`SchedulingError`] | the periodic loop | clock read or absolute sleep failed, boundary out of range |
//! | [`OutputError`] | the log writer / reader | log file cannot be created or parsed |
//! | [`EngineError`] | the messaging engine | management runtime or transport failure |
//!
//! [`HarnessError`] aggregates all of them for the binaries.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ── Setup ─────────────────────────────────────────────────────────────────────

/// A precondition of the run could not be established.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The harness configuration is inconsistent (priorities, CPUs, period).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read or parsed.
    #[error("cannot load configuration file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    /// The endpoint URL does not have the `<scheme>://<ipv4>:<port>` shape.
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The network interface identifier is not an IPv4 address.
    #[error("invalid network interface '{0}': expected the interface's IPv4 address")]
    InvalidInterface(String),

    /// A socket could not be created, bound or configured.
    #[error("socket setup failed during {op}: {source}")]
    Socket {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// One step of the real-time thread configuration failed.
    ///
    /// Partial configuration is never tolerated: an unpinned or
    /// non-real-time thread invalidates every timing measurement.
    #[error("thread '{thread}': {step} failed: {source}")]
    ThreadConfig {
        thread: String,
        step: &'static str,
        #[source]
        source: io::Error,
    },

    /// The platform cannot provide the requested execution context.
    #[error("unsupported platform: {0}")]
    Unsupported(&'static str),

    /// The measurement buffer for the requested sample count cannot be
    /// reserved up front.
    #[error("cannot allocate measurement buffer for {samples} samples: {source}")]
    Allocation {
        samples: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    /// The interrupt / termination handler could not be installed.
    #[error("cannot install signal handler: {0}")]
    SignalHandler(String),
}

// ── Scheduling ────────────────────────────────────────────────────────────────

/// The cyclic guarantee cannot be honoured.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// A cycle period of zero has no next boundary.
    #[error("cycle period must be greater than zero")]
    ZeroPeriod,

    /// `clock_gettime` failed.
    #[error("reading the real-time clock failed: {0}")]
    Clock(#[source] io::Error),

    /// `clock_nanosleep(TIMER_ABSTIME)` failed with something other than `EINTR`.
    #[error("absolute sleep until {wake_ns}ns failed: {source}")]
    Sleep {
        wake_ns: u64,
        #[source]
        source: io::Error,
    },

    /// The next boundary lies past the end of the 64-bit nanosecond clock.
    #[error("next cycle boundary after {now_ns}ns with period {period_ns}ns is out of clock range")]
    WakeupOverflow { now_ns: u64, period_ns: u64 },
}

// ── Output ────────────────────────────────────────────────────────────────────

/// The measurement log could not be written or read back.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path}:{line}: malformed record '{content}'")]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },
}

// ── Messaging engine ──────────────────────────────────────────────────────────

/// Failure inside the messaging engine collaborator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The management thread could not build or drive its runtime.
    #[error("management runtime failed: {0}")]
    Runtime(#[source] io::Error),

    /// A datagram could not be sent or received.
    #[error("transport failure: {0}")]
    Transport(#[source] io::Error),
}

// ── Aggregate ─────────────────────────────────────────────────────────────────

/// Top-level error returned by the lifecycle coordinator and the binaries.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A harness thread panicked instead of returning.
    #[error("thread '{0}' panicked")]
    ThreadPanicked(String),
}
