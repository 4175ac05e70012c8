/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Interrupt / termination handling.
//!
//! SIGINT, SIGTERM and SIGHUP abort the run: the signal is logged by name and
//! the process exits with status 1 without writing a measurement log.  There
//! is no graceful shutdown path.
//!
//! The signals are watched by a dedicated `signals` thread driving a
//! current-thread `tokio` runtime, so neither harness thread is ever
//! interrupted by handler work.

use std::io;
use std::process;
use std::sync::mpsc::{self, SyncSender};
use std::thread;

use tracing::{debug, error};

use crate::config::Role;
use crate::error::SetupError;

/// Install the process-wide abort handler.
///
/// Returns once the handlers are registered.
///
/// # Errors
/// [`SetupError::SignalHandler`] if the signal thread cannot be started or a
/// handler cannot be registered.
pub fn install(role: Role) -> Result<(), SetupError> {
    let (ready_tx, ready_rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name("signals".into())
        .spawn(move || watch(role, ready_tx))
        .map_err(|e| SetupError::SignalHandler(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(SetupError::SignalHandler(e.to_string())),
        Err(_) => Err(SetupError::SignalHandler(
            "signal thread exited during registration".into(),
        )),
    }
}

/// Body of the `signals` thread: register, report, then wait forever.
fn watch(role: Role, ready: SyncSender<io::Result<()>>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    let received = runtime.block_on(async {
        let mut watched = match Watched::register() {
            Ok(watched) => watched,
            Err(e) => {
                let _ = ready.send(Err(e));
                return None;
            }
        };
        let _ = ready.send(Ok(()));
        debug!(role = %role, "signal handlers installed");
        Some(watched.next().await)
    });

    if let Some(signal) = received {
        error!(role = %role, signal, "termination signal received, aborting run without log");
        process::exit(1);
    }
}

// ── Watched signals ───────────────────────────────────────────────────────────

#[cfg(unix)]
struct Watched {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Watched {
    /// Must be called from within a runtime.
    fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Name of the next signal delivered to the process.
    async fn next(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.hangup.recv() => "SIGHUP",
        }
    }
}

#[cfg(not(unix))]
struct Watched;

#[cfg(not(unix))]
impl Watched {
    fn register() -> io::Result<Self> {
        Ok(Self)
    }

    async fn next(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "Ctrl-C",
            Err(_) => std::future::pending().await,
        }
    }
}
