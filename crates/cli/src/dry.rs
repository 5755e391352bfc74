//! `-n`: run the selection and hook engine without compiling anything.
//!
//! Every selected example passes implicitly, so the report shows exactly
//! what the current `E`/`L`/`I`/`F` filters would run, in order.

use std::io::{self, Write};

use rodzo_eval::{DryRunner, Filters, ReportOptions, Session};
use rodzo_table::NodeTable;

/// Report as text, or the session as JSON when `json` is set.
pub fn dry_run(
    table: &NodeTable,
    filters: &Filters,
    program: &str,
    json: bool,
    mut out: impl Write,
) -> io::Result<Session> {
    let mut runner = DryRunner::default();
    if json {
        let selection = rodzo_eval::select(table, filters);
        let session = rodzo_eval::execute(table, &selection, &mut runner, &mut ())?;
        let value = serde_json::json!({
            "invoked": runner.invoked,
            "session": session,
        });
        serde_json::to_writer_pretty(&mut out, &value)?;
        writeln!(out)?;
        return Ok(session);
    }
    rodzo_eval::run(
        table,
        filters,
        &mut runner,
        out,
        ReportOptions::new(filters, program),
    )
}
