//! rodzo-eval: the runtime half of rodzo, over a flattened node table.
//!
//! The generated C program carries its own copy of these algorithms. This
//! crate is the reference the CLI's dry run executes: filters come from the
//! environment, selection turns them into run flags, the engine walks the
//! tree invoking units through a [`UnitRunner`] and the [`Reporter`] prints
//! what happened.

pub mod execute;
pub mod filter;
pub mod report;
pub mod result;
pub mod select;

pub use execute::{execute, DryRunner, Observer, UnitRunner};
pub use filter::{truthy, Filters, Mark};
pub use report::{hexdump, ReportOptions, Reporter};
pub use result::{Operands, Outcome, Session, TestResult};
pub use select::{select, Selection};

use std::io::{self, Write};

use rodzo_table::NodeTable;

/// Select with `filters`, run every selected unit through `runner` and
/// report to `out`.
pub fn run<R, W>(
    table: &NodeTable,
    filters: &Filters,
    runner: &mut R,
    out: W,
    options: ReportOptions,
) -> io::Result<Session>
where
    R: UnitRunner + ?Sized,
    W: Write,
{
    let selection = select(table, filters);
    let mut reporter = Reporter::new(out, options);
    reporter.begin()?;
    let session = execute(table, &selection, runner, &mut reporter)?;
    reporter.summary(table, &session)?;
    Ok(session)
}
