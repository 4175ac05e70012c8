/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Command-line interface shared by both role binaries.
//!
//! Example:
//!   rtpubsub-publisher 192.168.1.10 opc.udp://224.0.0.22:4840/ 4841 1000000 10000 \
//!                      --config harness.yaml

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Cyclic real-time publish/subscribe measurement harness.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(about = "Cyclic real-time publish/subscribe latency and jitter harness", long_about = None)]
pub struct Cli {
    /// IPv4 address of the network interface carrying the traffic.
    pub interface: String,

    /// Publish/subscribe endpoint, e.g. opc.udp://224.0.0.22:4840/
    pub url: String,

    /// TCP port of the management status server.
    pub server_port: u16,

    /// Cycle period in nanoseconds.
    pub cycle_time_ns: u64,

    /// Number of samples to record before terminating.
    pub sample_count: u64,

    /// Path to the YAML harness configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

/// What the process should do after argument parsing.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Run(Cli),
    /// Wrong number of arguments: print this line and exit successfully.
    Usage(String),
}

/// Parse `args` (including the program name).
///
/// A missing or surplus positional argument yields [`Invocation::Usage`];
/// any other problem (unparsable number, `--help`) is returned as the clap
/// error so the caller can `exit()` with clap's own status.
pub fn parse_from<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(args.iter().cloned()) {
        Ok(cli) => Ok(Invocation::Run(cli)),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::UnknownArgument
                    | ErrorKind::TooManyValues
            ) =>
        {
            Ok(Invocation::Usage(usage_line(args.first())))
        }
        Err(e) => Err(e),
    }
}

fn usage_line(program: Option<&OsString>) -> String {
    let name = program
        .and_then(|p| Path::new(p).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rtpubsub".to_string());
    format!(
        "usage: {name} <interface> <url> <server_port> <cycle_time_ns> <sample_count> [--config <file>]"
    )
}
