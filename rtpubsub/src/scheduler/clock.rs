/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Thin wrappers around the POSIX real-time clock.
//!
//! All timestamps are `CLOCK_REALTIME` nanoseconds since the epoch so that
//! independent publisher and subscriber processes phase-lock to the same
//! wall-clock cycle boundaries.

use std::io;

use crate::error::SchedulingError;

/// Nanoseconds in one second.
pub const NS_PER_SEC: u64 = 1_000_000_000;

/// Current `CLOCK_REALTIME` time in nanoseconds since the epoch.
pub fn now_ns() -> Result<u64, SchedulingError> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts) };
    if rc != 0 {
        return Err(SchedulingError::Clock(io::Error::last_os_error()));
    }
    Ok(ts.tv_sec as u64 * NS_PER_SEC + ts.tv_nsec as u64)
}

/// Block until the absolute `CLOCK_REALTIME` instant `wake_ns`.
///
/// `EINTR` is retried: the target is absolute, so re-issuing the same
/// request cannot drift.  Any other error is returned.
pub fn sleep_until_ns(wake_ns: u64) -> Result<(), SchedulingError> {
    let ts = to_timespec(wake_ns);
    loop {
        // SAFETY: `ts` is a valid timespec; the remaining-time pointer may be
        // null for TIMER_ABSTIME requests.
        let rc = unsafe {
            libc::clock_nanosleep(
                libc::CLOCK_REALTIME,
                libc::TIMER_ABSTIME,
                &ts,
                std::ptr::null_mut(),
            )
        };
        match rc {
            0 => return Ok(()),
            libc::EINTR => continue,
            errno => {
                return Err(SchedulingError::Sleep {
                    wake_ns,
                    source: io::Error::from_raw_os_error(errno),
                })
            }
        }
    }
}

fn to_timespec(ns: u64) -> libc::timespec {
    libc::timespec {
        tv_sec: (ns / NS_PER_SEC) as libc::time_t,
        tv_nsec: (ns % NS_PER_SEC) as libc::c_long,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_timespec_splits_seconds_and_nanoseconds() {
        let ts = to_timespec(3 * NS_PER_SEC + 250);
        assert_eq!(ts.tv_sec, 3);
        assert_eq!(ts.tv_nsec, 250);
    }

    #[test]
    fn now_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(now_ns().unwrap() > 1_577_836_800 * NS_PER_SEC);
    }

    #[test]
    fn sleep_until_past_instant_returns_immediately() {
        let before = now_ns().unwrap();
        sleep_until_ns(before - NS_PER_SEC).unwrap();
        assert!(now_ns().unwrap() - before < NS_PER_SEC);
    }

    #[test]
    fn sleep_until_future_instant_does_not_wake_early() {
        let target = now_ns().unwrap() + 2_000_000; // +2 ms
        sleep_until_ns(target).unwrap();
        assert!(now_ns().unwrap() >= target);
    }
}
