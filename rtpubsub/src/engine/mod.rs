/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Messaging-engine collaborator interface.
//!
//! The harness core never sees sockets or frames.  It drives the engine
//! through three narrow traits:
//!
//! ```text
//!            setup (once, synchronous, before any thread starts)
//!                 │
//!      ┌──────────┴───────────┐
//!      ▼                      ▼
//!  EngineServer           WriterGroup / ReaderGroup
//!  serve(running)         publish() / subscribe()
//!  management thread      periodic-loop thread, once per cycle
//! ```
//!
//! Groups are bound to the [`MonitoredValue`](crate::shared::MonitoredValue)
//! at setup: a writer group reads it when publishing, a reader group writes
//! it when a new value is delivered.
//!
//! [`udp`] provides the shipped implementation.

pub mod frame;
pub mod status;
pub mod udp;
pub mod url;

use crate::error::EngineError;
use crate::shared::RunningFlag;

/// The engine's own event processing, run on the management thread.
pub trait EngineServer: Send + Sync + 'static {
    /// Process engine events until `running` becomes `false`.
    ///
    /// The returned value is the management thread's completion status; the
    /// process only exits successfully if it is `Ok`.
    fn serve(&self, running: &RunningFlag) -> Result<(), EngineError>;
}

/// Outbound step: hands the bound value to the transport.
pub trait WriterGroup: Send + 'static {
    fn publish(&mut self) -> Result<(), EngineError>;
}

/// Inbound step: delivers at most one pending message into the bound value.
pub trait ReaderGroup: Send + 'static {
    fn subscribe(&mut self) -> Result<(), EngineError>;
}
