/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Observe role: records every newly delivered counter value to
//! `subscribe.csv`.

use std::process::ExitCode;

use rtpubsub::config::Role;

fn main() -> ExitCode {
    rtpubsub::app::main(Role::Subscriber)
}
