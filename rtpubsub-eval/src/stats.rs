/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Descriptive statistics of one series.
//!
//! Quartiles use the exclusive method (the sample is treated as drawn from a
//! larger population, positions at `i·(n+1)/4`), matching the usual
//! spreadsheet `QUARTILE.EXC` definition.  The standard deviation is the
//! sample (n−1) deviation.

use crate::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub median: f64,
    /// Interquartile range, q3 − q1.
    pub iqr: f64,
    pub mean: f64,
    pub stdev: f64,
}

/// Summarise `values`, labelled `series` in errors.
///
/// # Errors
/// [`EvalError::TooFewPoints`] for fewer than two values.
pub fn summarize(series: &str, values: &[f64]) -> Result<Summary, EvalError> {
    if values.len() < 2 {
        return Err(EvalError::TooFewPoints {
            series: series.to_string(),
            len: values.len(),
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let [q1, _, q3] = quartiles_exclusive(&sorted);

    Ok(Summary {
        min,
        max,
        range: max - min,
        median: median(&sorted),
        iqr: q3 - q1,
        mean: mean(values),
        stdev: sample_stdev(values),
    })
}

/// Median of an already sorted, non-empty slice.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; requires at least two values.
pub fn sample_stdev(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Cut points dividing a sorted slice (len ≥ 2) into four groups.
///
/// Positions outside the data are linearly extrapolated from the two
/// outermost points.
pub fn quartiles_exclusive(sorted: &[f64]) -> [f64; 3] {
    const N: i64 = 4;
    let len = sorted.len() as i64;
    let m = len + 1;

    let mut cuts = [0.0; 3];
    for (slot, i) in cuts.iter_mut().zip(1..N) {
        let j = (i * m / N).clamp(1, len - 1);
        let delta = i * m - j * N;
        let lo = sorted[(j - 1) as usize];
        let hi = sorted[j as usize];
        *slot = (lo * (N - delta) as f64 + hi * delta as f64) / N as f64;
    }
    cuts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quartiles_of_one_to_ten() {
        let data: Vec<f64> = (1..=10).map(f64::from).collect();
        let [q1, q2, q3] = quartiles_exclusive(&data);
        assert!(close(q1, 2.75));
        assert!(close(q2, 5.5));
        assert!(close(q3, 8.25));
    }

    #[test]
    fn quartiles_of_two_points_extrapolate() {
        let [q1, q2, q3] = quartiles_exclusive(&[1.0, 2.0]);
        assert!(close(q1, 0.75));
        assert!(close(q2, 1.5));
        assert!(close(q3, 2.25));
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[1.0, 3.0, 9.0]), 3.0);
        assert_eq!(median(&[1.0, 3.0, 5.0, 9.0]), 4.0);
    }

    #[test]
    fn summary_of_known_sample() {
        let s = summarize("x", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.range, 7.0);
        assert_eq!(s.median, 4.5);
        assert!(close(s.mean, 5.0));
        // sum of squared deviations 32 over n−1 = 7
        assert!(close(s.stdev, (32.0f64 / 7.0).sqrt()));
        // exclusive quartiles at positions 2.25 and 6.75
        assert!(close(s.iqr, 6.5 - 4.0));
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = summarize("a", &[3.0, 1.0, 2.0, 5.0, 4.0]).unwrap();
        let b = summarize("b", &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_point_is_rejected() {
        let err = summarize("publish interval [ms]", &[1.0]).unwrap_err();
        assert!(matches!(err, EvalError::TooFewPoints { len: 1, .. }));
        assert!(err.to_string().contains("publish interval"));
    }
}
