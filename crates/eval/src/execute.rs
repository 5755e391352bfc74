//! Hook and example execution engine.
//!
//! Walks the table depth first from the root. For every running group:
//! its before-all hooks, then each running example or group child wrapped
//! in the offline hooks of the whole chain (before-each-offline root down,
//! after-each-offline back up), then its after-all hooks. Each hooks are
//! already part of the example units and never show up here.

use std::io;
use std::time::Duration;

use rodzo_table::{NodeId, NodeKind, NodeTable, TableEntry};
use tracing::debug;

use crate::result::{Session, TestResult};
use crate::select::Selection;

// ──────────────────────────────────────────────
// Traits
// ──────────────────────────────────────────────

/// Invokes the compiled units behind table entries.
///
/// Runners record assertion outcomes into the session they are handed;
/// an example that records nothing counts as one pass.
pub trait UnitRunner {
    fn invoke_hook(&mut self, hook: &TableEntry, session: &mut Session);

    fn invoke_example(&mut self, example: &TableEntry, session: &mut Session);
}

/// Notified once per finished example, with the results it produced.
pub trait Observer {
    fn example_finished(
        &mut self,
        table: &NodeTable,
        example: NodeId,
        results: &[TestResult],
        duration: Duration,
    ) -> io::Result<()>;
}

impl Observer for () {
    fn example_finished(
        &mut self,
        _table: &NodeTable,
        _example: NodeId,
        _results: &[TestResult],
        _duration: Duration,
    ) -> io::Result<()> {
        Ok(())
    }
}

// ──────────────────────────────────────────────
// DryRunner
// ──────────────────────────────────────────────

/// Runs nothing: hooks are skipped and every example passes implicitly.
/// Shows what a filter selects and in which order.
#[derive(Debug, Default)]
pub struct DryRunner {
    /// Units in invocation order.
    pub invoked: Vec<String>,
}

impl UnitRunner for DryRunner {
    fn invoke_hook(&mut self, hook: &TableEntry, _session: &mut Session) {
        if let Some(unit) = &hook.unit {
            self.invoked.push(unit.name().to_string());
        }
    }

    fn invoke_example(&mut self, example: &TableEntry, _session: &mut Session) {
        if let Some(unit) = &example.unit {
            self.invoked.push(unit.name().to_string());
        }
    }
}

// ──────────────────────────────────────────────
// Engine
// ──────────────────────────────────────────────

/// Execute everything `selection` lets run and return the session.
pub fn execute<R, O>(
    table: &NodeTable,
    selection: &Selection,
    runner: &mut R,
    observer: &mut O,
) -> io::Result<Session>
where
    R: UnitRunner + ?Sized,
    O: Observer + ?Sized,
{
    let mut engine = Engine {
        table,
        selection,
        runner,
        observer,
        session: Session::new(),
    };
    if !table.is_empty() && selection.runs(0) {
        engine.run_group(0)?;
    }
    let mut session = engine.session;
    session.finish();
    debug!(
        examples = session.examples,
        failures = session.failures,
        "run finished"
    );
    Ok(session)
}

struct Engine<'a, R: ?Sized, O: ?Sized> {
    table: &'a NodeTable,
    selection: &'a Selection,
    runner: &'a mut R,
    observer: &'a mut O,
    session: Session,
}

impl<R: UnitRunner + ?Sized, O: Observer + ?Sized> Engine<'_, R, O> {
    fn run_group(&mut self, gid: NodeId) -> io::Result<()> {
        self.run_hooks(gid, NodeKind::BeforeAll);

        let children = self.table.nodes[gid].children.clone();
        for child in children {
            let kind = self.table.nodes[child].kind;
            if !self.selection.runs(child) || !(kind == NodeKind::Example || kind.is_group()) {
                continue;
            }

            self.run_hooks(gid, NodeKind::BeforeEachOffline);
            if kind == NodeKind::Example {
                self.run_example(child)?;
            } else {
                self.run_group(child)?;
            }
            self.run_hooks(gid, NodeKind::AfterEachOffline);
        }

        self.run_hooks(gid, NodeKind::AfterAll);
        Ok(())
    }

    fn run_example(&mut self, id: NodeId) -> io::Result<()> {
        let table = self.table;
        let entry = &table.nodes[id];
        let first = self.session.start_example();

        match table.children(id).find(|c| c.kind == NodeKind::Pending) {
            Some(pending) => self.session.record_pending(
                pending.id,
                pending.text.as_ref().map(|_| pending.display_text().into_owned()),
                pending.local_line,
                pending.global_line,
            ),
            None => {
                if entry.unit.is_some() {
                    self.runner.invoke_example(entry, &mut self.session);
                }
                if self.session.results.len() == first {
                    self.session
                        .record_pass(id, entry.local_line, entry.global_line);
                }
            }
        }

        let duration = self.session.example_elapsed();
        self.observer
            .example_finished(table, id, &self.session.results[first..], duration)
    }

    fn run_hooks(&mut self, gid: NodeId, kind: NodeKind) {
        let table = self.table;
        for hook in table.hooks(gid, kind) {
            if self.selection.runs(hook.id) && hook.unit.is_some() {
                self.runner.invoke_hook(hook, &mut self.session);
            }
        }
    }
}
