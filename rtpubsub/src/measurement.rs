/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pre-allocated measurement storage written by the periodic loop.
//!
//! # Ownership model
//! The buffer is **moved** into the periodic-loop thread, filled there, and
//! moved back out through the thread's join handle.  The compiler therefore
//! guarantees the single-writer rule and that the log writer only sees the
//! buffer after the loop thread has terminated.
//!
//! The whole capacity is allocated up front so that appending never
//! allocates inside the cycle.  A count the allocator cannot satisfy is a
//! setup failure, reported before any thread starts.

use crate::error::SetupError;

// ── Sample ────────────────────────────────────────────────────────────────────

/// One recorded `(value, timestamp)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub value: u64,
    /// `CLOCK_REALTIME` nanoseconds since the epoch.
    pub timestamp_ns: u64,
}

// ── MeasurementBuffer ─────────────────────────────────────────────────────────

/// Append-only, fixed-capacity sequence of [`Sample`]s.
///
/// Supports the two-phase write used by the emit loop: the value is
/// [staged](Self::stage) before the cyclic wait and the slot is
/// [committed](Self::commit) with the timestamp taken after it.
#[derive(Debug)]
pub struct MeasurementBuffer {
    samples: Vec<Sample>,
    capacity: usize,
    staged: Option<u64>,
}

impl MeasurementBuffer {
    /// Allocate storage for exactly `capacity` samples.
    ///
    /// # Errors
    /// [`SetupError::Allocation`] if the storage cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self, SetupError> {
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(capacity)
            .map_err(|source| SetupError::Allocation {
                samples: capacity,
                source,
            })?;
        Ok(Self {
            samples,
            capacity,
            staged: None,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of committed samples (the write cursor).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns `true` once the configured sample count has been reached.
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Write `value` into the next slot without advancing the cursor.
    ///
    /// A second `stage` before `commit` overwrites the staged value.
    pub fn stage(&mut self, value: u64) {
        self.staged = Some(value);
    }

    /// Complete the staged slot with `timestamp_ns` and advance the cursor.
    ///
    /// Returns the new length, or `None` if nothing was staged or the buffer
    /// is already full (the staged value is discarded in that case).
    pub fn commit(&mut self, timestamp_ns: u64) -> Option<usize> {
        let value = self.staged.take()?;
        self.push(Sample {
            value,
            timestamp_ns,
        })
    }

    /// Append a complete sample.  Returns the new length, or `None` when full.
    pub fn push(&mut self, sample: Sample) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.samples.push(sample);
        Some(self.samples.len())
    }

    /// Committed samples in chronological order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}
