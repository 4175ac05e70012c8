/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Emit role: publishes an incrementing counter on every cycle boundary and
//! logs `value,timestamp_ns` to `publish.csv`.

use std::process::ExitCode;

use rtpubsub::config::Role;

fn main() -> ExitCode {
    rtpubsub::app::main(Role::Publisher)
}
