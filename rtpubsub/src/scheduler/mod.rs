/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Cyclic scheduler: phase-locked wake-ups on absolute cycle boundaries.
//!
//! Every wake-up instant is recomputed from the current absolute time:
//!
//! ```text
//! remainder = now mod period
//! lead      = period − (offset mod period)
//! next      = now − remainder + lead            if remainder < lead
//!           = now − remainder + lead + period   otherwise
//! ```
//!
//! so `next` is always the first instant strictly after `now` that sits
//! `offset` nanoseconds before a multiple of `period` counted from the epoch.
//! A late wake-up in one cycle therefore never shifts later cycles, unlike a
//! relative `sleep(period)` loop whose error accumulates.
//!
//! | Approach | Error growth over N cycles |
//! |---|---|
//! | relative sleep | O(N), every call's overhead adds up |
//! | absolute `clock_nanosleep(TIMER_ABSTIME)` on recomputed boundary | O(1) |

pub mod clock;

use std::num::NonZeroU64;

use crate::error::SchedulingError;

pub use clock::{now_ns, sleep_until_ns, NS_PER_SEC};

/// Compute the next wake-up instant strictly after `now_ns`.
///
/// `offset_ns` is reduced modulo `period_ns`, so any value is accepted.
/// Returns `None` if that instant is not representable in a `u64`.
pub fn next_wakeup(now_ns: u64, period_ns: NonZeroU64, offset_ns: u64) -> Option<u64> {
    let period = period_ns.get();
    let remainder = now_ns % period;
    let lead = period - offset_ns % period;
    let slot = (now_ns - remainder).checked_add(lead)?;
    if remainder < lead {
        Some(slot)
    } else {
        slot.checked_add(period)
    }
}

// ── CyclicScheduler ───────────────────────────────────────────────────────────

/// Blocks the calling thread until the next cycle boundary.
#[derive(Debug, Clone, Copy)]
pub struct CyclicScheduler {
    period_ns: NonZeroU64,
    offset_ns: u64,
}

impl CyclicScheduler {
    /// Create a scheduler for `period_ns` with a sub-cycle `offset_ns`.
    ///
    /// # Errors
    /// [`SchedulingError::ZeroPeriod`] if `period_ns == 0`.
    pub fn new(period_ns: u64, offset_ns: u64) -> Result<Self, SchedulingError> {
        let period_ns = NonZeroU64::new(period_ns).ok_or(SchedulingError::ZeroPeriod)?;
        Ok(Self {
            period_ns,
            offset_ns: offset_ns % period_ns.get(),
        })
    }

    pub fn period_ns(&self) -> u64 {
        self.period_ns.get()
    }

    pub fn offset_ns(&self) -> u64 {
        self.offset_ns
    }

    /// Sleep until the next boundary and return the instant that was targeted.
    ///
    /// # Errors
    /// Any clock or sleep failure, or [`SchedulingError::WakeupOverflow`]
    /// when the next boundary lies beyond the clock's range.  The caller must
    /// treat it as fatal: the cyclic guarantee no longer holds.
    pub fn wait_next_cycle(&self) -> Result<u64, SchedulingError> {
        let now_ns = now_ns()?;
        let wake_ns = next_wakeup(now_ns, self.period_ns, self.offset_ns).ok_or(
            SchedulingError::WakeupOverflow {
                now_ns,
                period_ns: self.period_ns.get(),
            },
        )?;
        sleep_until_ns(wake_ns)?;
        Ok(wake_ns)
    }
}
