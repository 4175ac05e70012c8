/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Derived timing series, all in milliseconds.
//!
//! | Series | Point i |
//! |---|---|
//! | publish interval | `pub[i+1].ts − pub[i].ts` |
//! | subscribe interval | `sub[i+1].ts − sub[i].ts` |
//! | transmission time | `sub[i].ts − pub[i].ts` |
//! | publish jitter | `pub[i].ts − (pub[0].ts + i·period)` |
//! | subscribe jitter | `sub[i].ts − (sub[0].ts + i·period)` |
//!
//! Differences are signed: clock offsets between the two hosts can make
//! transmission times negative.

use rtpubsub::measurement::Sample;

use crate::error::EvalError;
use crate::stats::{summarize, Summary};

const MS_PER_NS: f64 = 1e-6;

/// One named series of millisecond values.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: &'static str,
    pub values_ms: Vec<f64>,
}

/// One line of the evaluation report.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: &'static str,
    pub summary: Summary,
}

/// Check that the two logs describe the same delivered sequence.
///
/// # Errors
/// [`EvalError::LengthMismatch`], [`EvalError::ValueMismatch`] or, with
/// `expected` set, [`EvalError::SampleCount`].
pub fn check_pairing(
    publish: &[Sample],
    subscribe: &[Sample],
    expected: Option<usize>,
) -> Result<(), EvalError> {
    if publish.len() != subscribe.len() {
        return Err(EvalError::LengthMismatch {
            publish: publish.len(),
            subscribe: subscribe.len(),
        });
    }
    if let Some((index, (p, s))) = publish
        .iter()
        .zip(subscribe)
        .enumerate()
        .find(|(_, (p, s))| p.value != s.value)
    {
        return Err(EvalError::ValueMismatch {
            index,
            publish: p.value,
            subscribe: s.value,
        });
    }
    if let Some(expected) = expected {
        if publish.len() != expected {
            return Err(EvalError::SampleCount {
                expected,
                actual: publish.len(),
            });
        }
    }
    Ok(())
}

fn diff_ms(later: u64, earlier: u64) -> f64 {
    (i128::from(later) - i128::from(earlier)) as f64 * MS_PER_NS
}

fn intervals(samples: &[Sample]) -> Vec<f64> {
    samples
        .windows(2)
        .map(|w| diff_ms(w[1].timestamp_ns, w[0].timestamp_ns))
        .collect()
}

fn jitters(samples: &[Sample], period_ns: u64) -> Vec<f64> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let target = i128::from(first.timestamp_ns) + i as i128 * i128::from(period_ns);
            (i128::from(s.timestamp_ns) - target) as f64 * MS_PER_NS
        })
        .collect()
}

/// Build the five series from a paired log set.
pub fn compute_series(publish: &[Sample], subscribe: &[Sample], period_ns: u64) -> Vec<Series> {
    vec![
        Series {
            name: "publish interval [ms]",
            values_ms: intervals(publish),
        },
        Series {
            name: "subscribe interval [ms]",
            values_ms: intervals(subscribe),
        },
        Series {
            name: "transmission time [ms]",
            values_ms: publish
                .iter()
                .zip(subscribe)
                .map(|(p, s)| diff_ms(s.timestamp_ns, p.timestamp_ns))
                .collect(),
        },
        Series {
            name: "publish jitter [ms]",
            values_ms: jitters(publish, period_ns),
        },
        Series {
            name: "subscribe jitter [ms]",
            values_ms: jitters(subscribe, period_ns),
        },
    ]
}

/// Validate, derive and summarise in one go.
///
/// # Errors
/// Any pairing error from [`check_pairing`], [`EvalError::ZeroPeriod`], or
/// [`EvalError::TooFewPoints`] if the logs are too short for intervals.
pub fn evaluate(
    publish: &[Sample],
    subscribe: &[Sample],
    period_ns: u64,
    expected: Option<usize>,
) -> Result<Vec<Row>, EvalError> {
    if period_ns == 0 {
        return Err(EvalError::ZeroPeriod);
    }
    check_pairing(publish, subscribe, expected)?;
    compute_series(publish, subscribe, period_ns)
        .into_iter()
        .map(|s| {
            Ok(Row {
                name: s.name,
                summary: summarize(s.name, &s.values_ms)?,
            })
        })
        .collect()
}
