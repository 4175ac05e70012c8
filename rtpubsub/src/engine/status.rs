/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Management-thread status endpoint.
//!
//! A TCP listener on the server port answers every connection with a single
//! line and closes it:
//!
//! ```text
//! role=publisher value=1234 step_failures=0
//! ```
//!
//! The listener is bound during setup so a port conflict fails the run
//! before any thread starts.  Serving happens on a current-thread `tokio`
//! runtime owned by the management thread; the running flag is polled
//! between connections.

use std::net::{SocketAddr, SocketAddrV4, TcpListener as StdTcpListener};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::{EngineError, SetupError};
use crate::shared::{MonitoredValue, RunningFlag};

/// How often the serve loop re-checks the running flag while idle.
const FLAG_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct StatusServer {
    listener: StdTcpListener,
    role: &'static str,
    value: MonitoredValue,
    step_failures: Arc<AtomicU64>,
}

impl StatusServer {
    /// Bind the status listener on `addr`.
    ///
    /// # Errors
    /// [`SetupError::Socket`] if the address is unavailable or in use.
    pub fn bind(
        addr: SocketAddrV4,
        role: &'static str,
        value: MonitoredValue,
        step_failures: Arc<AtomicU64>,
    ) -> Result<Self, SetupError> {
        let listener = StdTcpListener::bind(addr).map_err(|source| SetupError::Socket {
            op: "bind status listener",
            source,
        })?;
        // tokio requires a non-blocking socket in from_std().
        listener
            .set_nonblocking(true)
            .map_err(|source| SetupError::Socket {
                op: "set status listener non-blocking",
                source,
            })?;
        Ok(Self {
            listener,
            role,
            value,
            step_failures,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn status_line(&self) -> String {
        format!(
            "role={} value={} step_failures={}\n",
            self.role,
            self.value.load(),
            self.step_failures.load(Ordering::Relaxed)
        )
    }

    /// Answer status requests until `running` clears.
    ///
    /// # Errors
    /// [`EngineError::Runtime`] if the runtime cannot be built or the
    /// listener cannot be registered with it.  Per-connection failures are
    /// logged and do not end the loop.
    pub fn serve(&self, running: &RunningFlag) -> Result<(), EngineError> {
        let std_listener = self.listener.try_clone().map_err(EngineError::Runtime)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;

        runtime.block_on(async {
            let listener = TcpListener::from_std(std_listener).map_err(EngineError::Runtime)?;
            if let Ok(addr) = listener.local_addr() {
                info!(addr = %addr, role = self.role, "status server listening");
            }

            let mut poll = tokio::time::interval(FLAG_POLL_INTERVAL);
            while running.is_running() {
                tokio::select! {
                    accepted = listener.accept() => match accepted {
                        Ok((mut stream, peer)) => {
                            let line = self.status_line();
                            if let Err(e) = stream.write_all(line.as_bytes()).await {
                                warn!(peer = %peer, "status reply failed: {}", e);
                            } else {
                                debug!(peer = %peer, "status served");
                            }
                        }
                        Err(e) => warn!("status accept failed: {}", e),
                    },
                    _ = poll.tick() => {}
                }
            }

            info!(role = self.role, "status server stopped");
            Ok::<(), EngineError>(())
        })
    }
}
