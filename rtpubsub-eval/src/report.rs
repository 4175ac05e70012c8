/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! CSV rendering of the evaluation rows.

use std::io::{self, Write};

use crate::metrics::Row;

pub const HEADER: &str = "name,min,max,range,median,iqr,mean,stdev";

/// Write the header and one line per row, values with three decimals.
pub fn write_report<W: Write>(out: &mut W, rows: &[Row]) -> io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for row in rows {
        let s = &row.summary;
        writeln!(
            out,
            "{},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}",
            row.name, s.min, s.max, s.range, s.median, s.iqr, s.mean, s.stdev
        )?;
    }
    Ok(())
}

/// [`write_report`] into a `String`.
pub fn render(rows: &[Row]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_report(&mut buf, rows);
    String::from_utf8_lossy(&buf).into_owned()
}
