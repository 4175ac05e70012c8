/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Evaluation failures.

use rtpubsub::error::OutputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// A log file could not be read or parsed.
    #[error(transparent)]
    Log(#[from] OutputError),

    #[error("publish log has {publish} records but subscribe log has {subscribe}")]
    LengthMismatch { publish: usize, subscribe: usize },

    /// The subscriber did not observe exactly the published sequence.
    #[error("record {index}: published value {publish} but subscribed value {subscribe}")]
    ValueMismatch {
        index: usize,
        publish: u64,
        subscribe: u64,
    },

    #[error("expected {expected} records, logs contain {actual}")]
    SampleCount { expected: usize, actual: usize },

    #[error("series '{series}' has {len} point(s); at least 2 are required")]
    TooFewPoints { series: String, len: usize },

    #[error("cycle period must be greater than zero")]
    ZeroPeriod,
}
