//! Console reporter.
//!
//! Streams one line per finished example under the describe/context
//! headers that changed since the previous one, then prints the pending
//! and failure listings, the totals and one re-run line per failing
//! example.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use owo_colors::OwoColorize;
use rodzo_table::{NodeId, NodeKind, NodeTable};

use crate::execute::Observer;
use crate::filter::Filters;
use crate::result::{Operands, Outcome, Session, TestResult};

const HEXDUMP_WIDTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub color: bool,
    pub durations: bool,
    pub hexdump: bool,
    /// Program name used in re-run lines.
    pub program: String,
}

impl ReportOptions {
    pub fn new(filters: &Filters, program: impl Into<String>) -> Self {
        ReportOptions {
            color: color_enabled(),
            durations: !filters.no_duration,
            hexdump: filters.hexdump,
            program: program.into(),
        }
    }
}

/// Colors only on a terminal and only without `NO_COLOR`.
pub fn color_enabled() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Pass,
    Fail,
    Pending,
    Origin,
}

pub struct Reporter<W: Write> {
    out: W,
    options: ReportOptions,
    /// Header chain printed for the previous example.
    context: Vec<NodeId>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, options: ReportOptions) -> Self {
        Reporter {
            out,
            options,
            context: Vec::new(),
        }
    }

    pub fn begin(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Pending and failure listings, totals and re-run lines.
    pub fn summary(&mut self, table: &NodeTable, session: &Session) -> io::Result<()> {
        writeln!(self.out)?;

        if session.pendings > 0 {
            writeln!(self.out, "Pending:\n")?;
            for r in session.with_outcome(Outcome::Pending) {
                let title = self.paint(&table.title(r.node), Tone::Pending);
                let origin = format!("# {}:{}", table.nodes[r.node].file, r.local_line);
                let origin = self.paint(&origin, Tone::Origin);
                writeln!(self.out, "  {}", title)?;
                writeln!(self.out, "    # {}", r.message.as_deref().unwrap_or(""))?;
                writeln!(self.out, "    {}\n", origin)?;
            }
        }

        if session.failures > 0 {
            writeln!(self.out, "Failures:\n")?;
            for (j, r) in session.with_outcome(Outcome::Fail).enumerate() {
                self.failure(table, j + 1, r)?;
            }
        }

        if self.options.durations {
            writeln!(
                self.out,
                "Finished in {:.6} seconds",
                session.elapsed.as_secs_f64()
            )?;
        }

        let tone = if session.failures > 0 {
            Tone::Fail
        } else if session.pendings > 0 {
            Tone::Pending
        } else {
            Tone::Pass
        };
        let totals = self.paint(&session.totals(), tone);
        writeln!(self.out, "{}\n", totals)?;

        if session.failures > 0 {
            writeln!(self.out, "Failed examples:\n")?;
            let mut last = None;
            for r in session.with_outcome(Outcome::Fail) {
                if last == Some(r.node) {
                    continue;
                }
                last = Some(r.node);
                let rerun = self.paint(
                    &format!("I={} {}", r.node, self.options.program),
                    Tone::Fail,
                );
                let title = self.paint(&format!("# {}", table.title(r.node)), Tone::Origin);
                writeln!(self.out, "{} {}", rerun, title)?;
            }
            writeln!(self.out)?;
        }

        self.out.flush()
    }

    fn failure(&mut self, table: &NodeTable, number: usize, r: &TestResult) -> io::Result<()> {
        let file = &table.nodes[r.node].file;
        let excerpt = self.paint(&source_line(file, r.local_line), Tone::Fail);
        let origin = self.paint(&format!("# {}:{}", file, r.local_line), Tone::Origin);

        writeln!(self.out, "  {}) {}", number, table.title(r.node))?;
        writeln!(self.out, "     >{}<", excerpt)?;
        if let Some(message) = &r.message {
            for line in message.lines() {
                let line = self.paint(line, Tone::Fail);
                writeln!(self.out, "     {}", line)?;
            }
        }
        writeln!(self.out, "     {} ({})", origin, r.global_line)?;
        if self.options.hexdump {
            if let Some(operands) = &r.operands {
                write!(self.out, "{}", hexdump(operands))?;
            }
        }
        writeln!(self.out)
    }

    fn print_context(&mut self, table: &NodeTable, example: NodeId) -> io::Result<()> {
        let mut chain: Vec<NodeId> = table
            .ancestors(example)
            .into_iter()
            .filter(|&a| matches!(table.nodes[a].kind, NodeKind::Describe | NodeKind::Context))
            .collect();
        chain.reverse();

        for (depth, &g) in chain.iter().enumerate() {
            if self.context.get(depth) == Some(&g) {
                continue;
            }
            writeln!(
                self.out,
                "{}{}",
                "  ".repeat(depth),
                table.nodes[g].display_text()
            )?;
        }
        self.context = chain;
        Ok(())
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.options.color {
            return text.to_string();
        }
        match tone {
            Tone::Pass => text.green().to_string(),
            Tone::Fail => text.red().to_string(),
            Tone::Pending => text.yellow().to_string(),
            Tone::Origin => text.cyan().to_string(),
        }
    }
}

impl<W: Write> Observer for Reporter<W> {
    fn example_finished(
        &mut self,
        table: &NodeTable,
        example: NodeId,
        results: &[TestResult],
        duration: Duration,
    ) -> io::Result<()> {
        let mut status = Outcome::Pass;
        let mut reason = None;
        for r in results {
            match r.outcome {
                Outcome::Fail => status = Outcome::Fail,
                Outcome::Pending if status != Outcome::Fail => {
                    status = Outcome::Pending;
                    reason = r.message.as_deref();
                }
                _ => {}
            }
        }

        self.print_context(table, example)?;
        let text = table.nodes[example].display_text();
        let text = text.as_ref();
        let line = match status {
            Outcome::Pass => self.paint(text, Tone::Pass),
            Outcome::Fail => self.paint(&format!("{} (FAILED)", text), Tone::Fail),
            Outcome::Pending => self.paint(
                &format!("{} (PENDING: {})", text, reason.unwrap_or("")),
                Tone::Pending,
            ),
        };
        write!(self.out, "{}{}", "  ".repeat(self.context.len()), line)?;
        if self.options.durations {
            write!(self.out, " ({:.6}s)", duration.as_secs_f64())?;
        }
        writeln!(self.out)
    }
}

// -- Helpers --

/// Line `line` of `file`, trimmed, or empty when it cannot be read.
fn source_line(file: &str, line: u32) -> String {
    std::fs::read_to_string(file)
        .ok()
        .and_then(|s| {
            s.lines()
                .nth(line.saturating_sub(1) as usize)
                .map(|l| l.trim().to_string())
        })
        .unwrap_or_default()
}

/// Side-by-side dump of the compared strings, eight bytes per row.
pub fn hexdump(operands: &Operands) -> String {
    let left = operands.left.as_deref().unwrap_or("").as_bytes();
    let right = operands.right.as_deref().unwrap_or("").as_bytes();
    let max = left.len().max(right.len());

    let mut out = String::from("     hexdump (result | expected):\n");
    for offset in (0..max).step_by(HEXDUMP_WIDTH) {
        out.push_str(&format!(
            "     {:04x}  {}  |  {}\n",
            offset,
            hexrow(left, offset),
            hexrow(right, offset)
        ));
    }
    out
}

fn hexrow(bytes: &[u8], offset: usize) -> String {
    let mut hex = String::new();
    let mut ascii = String::new();
    for j in offset..offset + HEXDUMP_WIDTH {
        match bytes.get(j) {
            Some(&b) => {
                hex.push_str(&format!("{:02x} ", b));
                ascii.push(if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                });
            }
            None => {
                hex.push_str("   ");
                ascii.push(' ');
            }
        }
    }
    format!("{} {}", hex, ascii)
}
