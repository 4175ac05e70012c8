/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Process bootstrap shared by the two role binaries.
//!
//! | Step | Failure |
//! |---|---|
//! | parse arguments | wrong count → usage, exit 0 |
//! | install signal handler, load config | exit 1 |
//! | engine setup (sockets, status listener) | exit 1, no log |
//! | run both threads | exit 1, no log |
//! | write log | exit 1 |
//! | management status | exit 1 if unhealthy (log still written) |

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{self, Cli, Invocation};
use crate::config::{HarnessConfig, Role};
use crate::coordinator::{self, RunOutcome, ThreadPlan};
use crate::engine::udp::{parse_interface, EndpointConfig, UdpEngine};
use crate::engine::url::EndpointUrl;
use crate::logfile::write_log;
use crate::periodic::{EmitCycle, ObserveCycle, ObservePacing};
use crate::scheduler::CyclicScheduler;
use crate::shared::{MonitoredValue, RunningFlag};
use crate::signals;

/// Initialise structured logging.
///
/// Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Entry point of a role binary.
pub fn main(role: Role) -> ExitCode {
    init_tracing();

    let cli = match cli::parse_from(std::env::args_os()) {
        Ok(Invocation::Run(cli)) => cli,
        Ok(Invocation::Usage(line)) => {
            info!("{}", line);
            return ExitCode::SUCCESS;
        }
        Err(e) => e.exit(),
    };

    if let Err(e) = signals::install(role) {
        error!("Failed to install signal handler: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(role, &cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!(role = %role, "management thread reported failure");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(role = %role, "run aborted: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Set up, run and log one measurement.
///
/// Returns the management thread's health.  Nothing is written unless both
/// threads joined normally.
///
/// # Errors
/// Any setup, scheduling or output failure.
pub fn run(role: Role, cli: &Cli) -> Result<bool> {
    info!(
        role          = %role,
        interface     = %cli.interface,
        url           = %cli.url,
        server_port   = cli.server_port,
        cycle_time_ns = cli.cycle_time_ns,
        sample_count  = cli.sample_count,
        config        = ?cli.config,
        "Configuration"
    );

    let config = HarnessConfig::load(cli.config.as_deref(), role)
        .context("Failed to load harness configuration")?;
    let endpoint = EndpointConfig {
        interface: parse_interface(&cli.interface)?,
        url: EndpointUrl::parse(&cli.url)?,
        server_port: cli.server_port,
    };
    let scheduler = CyclicScheduler::new(cli.cycle_time_ns, config.wake_offset_ns)?;
    let sample_count =
        usize::try_from(cli.sample_count).context("sample count does not fit in memory")?;

    let running = RunningFlag::new();
    let value = MonitoredValue::new(config.start_value);
    let plan = ThreadPlan::from(&config);

    let outcome: RunOutcome = match role {
        Role::Publisher => {
            let (engine, writer) =
                UdpEngine::setup_writer(&endpoint, &config.transport, value.clone())
                    .context("Failed to set up writer group")?;
            let body = EmitCycle::new(writer, value, scheduler);
            coordinator::run(engine, body, running, sample_count, &plan)?
        }
        Role::Subscriber => {
            let (engine, reader) =
                UdpEngine::setup_reader(&endpoint, &config.transport, value.clone())
                    .context("Failed to set up reader group")?;
            let pacing = match config.observe_pacing {
                ObservePacing::Busy => None,
                ObservePacing::Cyclic => Some(scheduler),
            };
            let body = ObserveCycle::new(reader, value, pacing);
            coordinator::run(engine, body, running, sample_count, &plan)?
        }
    };

    let healthy = outcome.is_success();
    write_log(&config.log_file, outcome.output.buffer)?;
    Ok(healthy)
}
