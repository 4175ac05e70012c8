/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! rtpubsub – cyclic real-time publish/subscribe measurement harness
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── scheduler/     – absolute-time cyclic wake-ups (clock_nanosleep)
//! ├── rt/            – SCHED_FIFO + CPU-pinned worker threads
//! ├── shared.rs      – running flag / monitored value
//! ├── measurement.rs – pre-allocated sample buffer
//! ├── periodic/      – loop state machine + emit / observe bodies
//! ├── engine/        – messaging-engine traits and the UDP engine
//! ├── coordinator.rs – thread start / join / outcome
//! ├── logfile.rs     – value,timestamp log writer and reader
//! ├── config/        – YAML harness configuration
//! ├── cli.rs         – positional command line
//! ├── signals.rs     – abort-on-signal handler
//! └── app.rs         – process bootstrap for the role binaries
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod logfile;
pub mod measurement;
pub mod periodic;
pub mod rt;
pub mod scheduler;
pub mod shared;
pub mod signals;
