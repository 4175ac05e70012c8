/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! rtpubsub-eval – offline evaluation of a publisher / subscriber log pair
//!
//! ```text
//! publish.csv ──┐
//!               ├─► metrics  (intervals, transmission, jitter in ms)
//! subscribe.csv ┘      │
//!                      ▼
//!                   stats   (min max range median iqr mean stdev)
//!                      │
//!                      ▼
//!                   report  (evaluation.csv + stdout)
//! ```

pub mod error;
pub mod metrics;
pub mod report;
pub mod stats;

pub use error::EvalError;
