/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Observe (subscribe) variant of the periodic loop body.
//!
//! Network delivery may be slower or lossier than the local cycle, so a
//! sample is only recorded when the inbound step actually changed the
//! monitored value.  Consecutive samples therefore never repeat a value.

use serde::Deserialize;

use crate::engine::ReaderGroup;
use crate::error::SchedulingError;
use crate::measurement::{MeasurementBuffer, Sample};
use crate::scheduler::{now_ns, CyclicScheduler};
use crate::shared::MonitoredValue;

use super::{CycleBody, CycleOutcome};

/// How the observe loop paces its inbound steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservePacing {
    /// Poll back-to-back; the timestamp resolution is the step duration.
    #[default]
    Busy,
    /// Wait for each cycle boundary before polling.
    Cyclic,
}

pub struct ObserveCycle<R: ReaderGroup> {
    group: R,
    value: MonitoredValue,
    pacing: Option<CyclicScheduler>,
}

impl<R: ReaderGroup> ObserveCycle<R> {
    /// `value` must be the same counter `group` writes into on delivery.
    ///
    /// `pacing` of `None` polls back-to-back.
    pub fn new(group: R, value: MonitoredValue, pacing: Option<CyclicScheduler>) -> Self {
        Self {
            group,
            value,
            pacing,
        }
    }
}

impl<R: ReaderGroup> CycleBody for ObserveCycle<R> {
    fn variant(&self) -> &'static str {
        "observe"
    }

    fn cycle(&mut self, buffer: &mut MeasurementBuffer) -> Result<CycleOutcome, SchedulingError> {
        if let Some(scheduler) = &self.pacing {
            scheduler.wait_next_cycle()?;
        }

        let before = self.value.load();
        let step_ok = self.group.subscribe().is_ok();
        let timestamp_ns = now_ns()?;
        let after = self.value.load();

        let recorded = before != after
            && buffer
                .push(Sample {
                    value: after,
                    timestamp_ns,
                })
                .is_some();
        Ok(CycleOutcome { recorded, step_ok })
    }
}
