/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Linux implementation of the per-thread real-time setup steps.

use std::io;

use crate::error::SetupError;

/// Switch the calling thread to SCHED_FIFO at `priority`.
pub(super) fn set_current_thread_fifo(thread: &str, priority: i32) -> Result<(), SetupError> {
    // SAFETY: plain queries without pointer arguments.
    let (min, max) = unsafe {
        (
            libc::sched_get_priority_min(libc::SCHED_FIFO),
            libc::sched_get_priority_max(libc::SCHED_FIFO),
        )
    };
    if !(min..=max).contains(&priority) {
        return Err(SetupError::ThreadConfig {
            thread: thread.to_string(),
            step: "SCHED_FIFO priority range",
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("priority {priority} outside {min}..={max}"),
            ),
        });
    }

    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pthread_self() is always valid.
    let rc = unsafe { libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &param) };
    if rc != 0 {
        return Err(SetupError::ThreadConfig {
            thread: thread.to_string(),
            step: "pthread_setschedparam(SCHED_FIFO)",
            source: io::Error::from_raw_os_error(rc),
        });
    }
    Ok(())
}

/// Restrict the calling thread to exactly one CPU.
pub(super) fn pin_current_thread(thread: &str, cpu: usize) -> Result<(), SetupError> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(SetupError::ThreadConfig {
            thread: thread.to_string(),
            step: "sched_setaffinity",
            source: io::Error::from_raw_os_error(libc::EINVAL),
        });
    }

    // SAFETY: an all-zero cpu_set_t is a valid empty set and `cpu` is in range.
    let rc = unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
    };
    if rc != 0 {
        return Err(SetupError::ThreadConfig {
            thread: thread.to_string(),
            step: "sched_setaffinity",
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}
