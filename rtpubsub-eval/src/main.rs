/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use rtpubsub::logfile::read_log;
use rtpubsub_eval::metrics::evaluate;
use rtpubsub_eval::report::render;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Latency / jitter evaluation of an rtpubsub log pair.
///
/// Example:
///   rtpubsub-eval -p logs/publish.csv -s logs/subscribe.csv -t 1000000 -n 10000
#[derive(Debug, Parser)]
#[command(
    name = "rtpubsub-eval",
    about = "Evaluate rtpubsub publish/subscribe logs",
    long_about = None,
)]
struct Cli {
    /// Log written by the publisher.
    #[arg(short = 'p', long = "publish", default_value = "publish.csv")]
    publish: PathBuf,

    /// Log written by the subscriber.
    #[arg(short = 's', long = "subscribe", default_value = "subscribe.csv")]
    subscribe: PathBuf,

    /// Cycle period the run used, in nanoseconds.
    #[arg(short = 't', long = "cycle-time-ns", default_value_t = 1_000_000)]
    cycle_time_ns: u64,

    /// Required number of records in each log.
    #[arg(short = 'n', long = "samples")]
    samples: Option<usize>,

    /// Where to write the evaluation CSV.
    #[arg(short = 'o', long = "output", default_value = "evaluation.csv")]
    output: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Evaluation failed: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    info!(
        publish       = %cli.publish.display(),
        subscribe     = %cli.subscribe.display(),
        cycle_time_ns = cli.cycle_time_ns,
        samples       = ?cli.samples,
        "Configuration"
    );

    let publish = read_log(&cli.publish)?;
    let subscribe = read_log(&cli.subscribe)?;
    info!(records = publish.len(), "logs loaded");

    let rows = evaluate(&publish, &subscribe, cli.cycle_time_ns, cli.samples)?;
    let report = render(&rows);

    fs::write(&cli.output, &report)
        .with_context(|| format!("Cannot write evaluation file: {}", cli.output.display()))?;
    info!(output = %cli.output.display(), "evaluation written");

    print!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtpubsub_eval::report::HEADER;
    use std::path::Path;
    use tempfile::tempdir;

    const PERIOD_NS: u64 = 1_000_000;

    /// Ten records one period apart, shifted by `delay_ns`.
    fn write_log(path: &Path, delay_ns: u64) {
        let log: String = (0..10u64)
            .map(|i| format!("{},{}\n", i + 1, 1_700_000_000_000_000_000 + i * PERIOD_NS + delay_ns))
            .collect();
        fs::write(path, log).unwrap();
    }

    fn cli(dir: &Path, samples: Option<usize>) -> Cli {
        Cli {
            publish: dir.join("publish.csv"),
            subscribe: dir.join("subscribe.csv"),
            cycle_time_ns: PERIOD_NS,
            samples,
            output: dir.join("evaluation.csv"),
        }
    }

    #[test]
    fn log_pair_produces_five_row_report() {
        let dir = tempdir().unwrap();
        write_log(&dir.path().join("publish.csv"), 0);
        write_log(&dir.path().join("subscribe.csv"), 250_000);

        run(&cli(dir.path(), Some(10))).unwrap();

        let report = fs::read_to_string(dir.path().join("evaluation.csv")).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], HEADER);
        let columns = |line: &str| -> Vec<f64> {
            line.split(',').skip(1).map(|v| v.parse().unwrap()).collect()
        };
        let interval = columns(lines[1]);
        assert_eq!(interval.len(), 7);
        assert!((interval[0] - 1.0).abs() < 1e-3 && (interval[1] - 1.0).abs() < 1e-3);
        let transmission = columns(lines[3]);
        assert!((transmission[3] - 0.25).abs() < 1e-3, "median {}", transmission[3]);
        for (line, name) in lines[1..].iter().zip([
            "publish interval [ms]",
            "subscribe interval [ms]",
            "transmission time [ms]",
            "publish jitter [ms]",
            "subscribe jitter [ms]",
        ]) {
            assert!(line.starts_with(name), "{line}");
        }
    }

    #[test]
    fn sample_count_mismatch_writes_no_report() {
        let dir = tempdir().unwrap();
        write_log(&dir.path().join("publish.csv"), 0);
        write_log(&dir.path().join("subscribe.csv"), 250_000);

        assert!(run(&cli(dir.path(), Some(11))).is_err());
        assert!(!dir.path().join("evaluation.csv").exists());
    }

    #[test]
    fn missing_log_is_an_error() {
        let dir = tempdir().unwrap();
        write_log(&dir.path().join("publish.csv"), 0);
        assert!(run(&cli(dir.path(), None)).is_err());
    }
}
