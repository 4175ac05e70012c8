/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Emit (publish) variant of the periodic loop body.

use crate::engine::WriterGroup;
use crate::error::SchedulingError;
use crate::measurement::MeasurementBuffer;
use crate::scheduler::{now_ns, CyclicScheduler};
use crate::shared::MonitoredValue;

use super::{CycleBody, CycleOutcome};

/// Advances the counter every cycle and publishes it on the cycle boundary.
///
/// The value is staged **before** the cyclic wait and the timestamp is taken
/// **after** it.  This ordering is what exposes wake-up latency in the
/// recorded data; do not merge the two writes.
pub struct EmitCycle<W: WriterGroup> {
    group: W,
    value: MonitoredValue,
    scheduler: CyclicScheduler,
}

impl<W: WriterGroup> EmitCycle<W> {
    /// `value` must be the same counter `group` was bound to at setup.
    pub fn new(group: W, value: MonitoredValue, scheduler: CyclicScheduler) -> Self {
        Self {
            group,
            value,
            scheduler,
        }
    }
}

impl<W: WriterGroup> CycleBody for EmitCycle<W> {
    fn variant(&self) -> &'static str {
        "emit"
    }

    fn cycle(&mut self, buffer: &mut MeasurementBuffer) -> Result<CycleOutcome, SchedulingError> {
        let value = self.value.increment();
        buffer.stage(value);
        self.scheduler.wait_next_cycle()?;
        let recorded = buffer.commit(now_ns()?).is_some();
        let step_ok = self.group.publish().is_ok();
        Ok(CycleOutcome { recorded, step_ok })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::periodic::PeriodicLoop;
    use crate::shared::RunningFlag;
    use std::io;
    use std::sync::{Arc, Mutex};

    const PERIOD_NS: u64 = 1_000_000;

    /// Writer that remembers every value it was asked to publish.
    struct RecordingWriter {
        value: MonitoredValue,
        published: Arc<Mutex<Vec<u64>>>,
        fail: bool,
    }

    impl WriterGroup for RecordingWriter {
        fn publish(&mut self) -> Result<(), EngineError> {
            self.published.lock().unwrap().push(self.value.load());
            if self.fail {
                Err(EngineError::Transport(io::Error::from(io::ErrorKind::Other)))
            } else {
                Ok(())
            }
        }
    }

    fn emit_loop(
        start: u64,
        count: usize,
        fail: bool,
    ) -> (PeriodicLoop<EmitCycle<RecordingWriter>>, Arc<Mutex<Vec<u64>>>) {
        let value = MonitoredValue::new(start);
        let published = Arc::new(Mutex::new(Vec::new()));
        let writer = RecordingWriter {
            value: value.clone(),
            published: published.clone(),
            fail,
        };
        let body = EmitCycle::new(writer, value, CyclicScheduler::new(PERIOD_NS, 0).unwrap());
        (PeriodicLoop::new(body, RunningFlag::new(), count).unwrap(), published)
    }

    #[test]
    fn five_cycles_record_counter_one_to_five() {
        let (lp, published) = emit_loop(0, 5, false);
        let out = lp.run().unwrap();

        let values: Vec<u64> = out.buffer.samples().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
        assert_eq!(*published.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(out.report.step_failures, 0);
    }

    #[test]
    fn sample_i_holds_start_plus_i_plus_one() {
        let (lp, _) = emit_loop(1_000, 4, false);
        let out = lp.run().unwrap();
        for (i, s) in out.buffer.samples().iter().enumerate() {
            assert_eq!(s.value, 1_000 + i as u64 + 1);
        }
    }

    #[test]
    fn timestamps_fall_into_successive_cycles() {
        let (lp, _) = emit_loop(0, 5, false);
        let out = lp.run().unwrap();
        let samples = out.buffer.samples();
        for pair in samples.windows(2) {
            assert!(pair[1].timestamp_ns > pair[0].timestamp_ns);
            // each wake-up lands in a later period slot than the previous one
            assert!(pair[1].timestamp_ns / PERIOD_NS > pair[0].timestamp_ns / PERIOD_NS);
        }
    }

    #[test]
    fn publish_failures_are_counted_but_samples_kept() {
        let (lp, _) = emit_loop(0, 3, true);
        let out = lp.run().unwrap();
        assert_eq!(out.buffer.len(), 3);
        assert_eq!(out.report.step_failures, 3);
    }

    #[test]
    fn zero_samples_never_touches_counter_or_engine() {
        let (lp, published) = emit_loop(0, 0, false);
        let out = lp.run().unwrap();
        assert!(out.buffer.is_empty());
        assert!(published.lock().unwrap().is_empty());
    }
}
