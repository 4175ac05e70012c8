/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The two scalars shared across the harness threads.
//!
//! # Ownership contract
//!
//! | Field | Writer | Readers |
//! |---|---|---|
//! | [`MonitoredValue`] (emit role) | periodic loop | writer group (outbound step), status server |
//! | [`MonitoredValue`] (observe role) | reader group (inbound step) | periodic loop, status server |
//! | [`RunningFlag`] | periodic loop (completion), any thread (abort) | everyone |
//!
//! Both are plain atomics.  Each field has a single writer per role, so no
//! read-modify-write race exists; `Relaxed` ordering on the value is enough
//! because the inbound/outbound step runs on the same thread as the loop.
//! The flag uses `Release`/`Acquire` so a thread that observes `false` also
//! observes everything the loop did before clearing it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

// ── RunningFlag ───────────────────────────────────────────────────────────────

/// Monotonic termination signal: starts `true`, may only ever become `false`.
#[derive(Debug, Clone)]
pub struct RunningFlag(Arc<AtomicBool>);

impl RunningFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag.  There is deliberately no way to set it again.
    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for RunningFlag {
    fn default() -> Self {
        Self::new()
    }
}

// ── MonitoredValue ────────────────────────────────────────────────────────────

/// The counter published by the emit role and observed by the observe role.
#[derive(Debug, Clone)]
pub struct MonitoredValue(Arc<AtomicU64>);

impl MonitoredValue {
    pub fn new(start: u64) -> Self {
        Self(Arc::new(AtomicU64::new(start)))
    }

    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn store(&self, value: u64) {
        self.0.store(value, Ordering::Relaxed);
    }

    /// Advance by one (wrapping) and return the new value.
    ///
    /// Only the emit loop calls this, so load + store is not a lost update.
    pub fn increment(&self) -> u64 {
        let next = self.load().wrapping_add(1);
        self.store(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_flag_starts_true_and_stays_false() {
        let flag = RunningFlag::new();
        assert!(flag.is_running());
        flag.stop();
        assert!(!flag.is_running());
        flag.stop();
        assert!(!flag.is_running());
    }

    #[test]
    fn running_flag_clones_share_state() {
        let flag = RunningFlag::new();
        let other = flag.clone();
        other.stop();
        assert!(!flag.is_running());
    }

    #[test]
    fn monitored_value_increment_returns_new_value() {
        let value = MonitoredValue::new(41);
        assert_eq!(value.increment(), 42);
        assert_eq!(value.load(), 42);
    }

    #[test]
    fn monitored_value_wraps_at_u64_max() {
        let value = MonitoredValue::new(u64::MAX);
        assert_eq!(value.increment(), 0);
    }

    #[test]
    fn monitored_value_visible_across_threads() {
        let value = MonitoredValue::new(0);
        let writer = value.clone();
        std::thread::spawn(move || writer.store(7)).join().unwrap();
        assert_eq!(value.load(), 7);
    }
}
