//! Two-pass example selection.
//!
//! Pass one marks the describe, context, example and pending nodes matching
//! the active filter. Pass two turns marks into run flags: forced subtrees,
//! ancestors of everything that runs, groups pruned to those with a running
//! example below them, hooks following their owning group.

use rodzo_table::{NodeId, NodeKind, NodeTable};
use tracing::debug;

use crate::filter::{Filters, Mark};

/// Run flags for every node of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    run: Vec<bool>,
}

impl Selection {
    pub fn runs(&self, id: NodeId) -> bool {
        self.run.get(id).copied().unwrap_or(false)
    }

    /// Ids of running nodes, ascending.
    pub fn running(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.run
            .iter()
            .enumerate()
            .filter_map(|(id, &run)| run.then_some(id))
    }

    /// Running example nodes, in declaration order.
    pub fn examples<'t>(&'t self, table: &'t NodeTable) -> impl Iterator<Item = NodeId> + 't {
        self.running()
            .filter(move |&id| table.nodes[id].kind == NodeKind::Example)
    }
}

/// Compute run flags. The result depends only on `table` and `filters`.
pub fn select(table: &NodeTable, filters: &Filters) -> Selection {
    let count = table.len();
    let marks: Vec<Option<Mark>> = table
        .iter()
        .map(|e| {
            if e.kind.is_selectable() {
                filters.mark(e)
            } else {
                None
            }
        })
        .collect();

    let mut run = vec![false; count];

    for (id, mark) in marks.iter().enumerate() {
        let Some(mark) = mark else { continue };
        let descendants = table.descendants(id);
        let force = match mark {
            Mark::Both => true,
            Mark::Standalone => table.nodes[id].kind.is_group(),
            Mark::Down => !descendants.iter().any(|&d| marks[d].is_some()),
        };

        run[id] = true;
        if force {
            for d in descendants {
                run[d] = true;
            }
        }
    }

    for entry in table.iter() {
        if run[entry.id] && is_leaf(entry.kind) {
            for a in table.ancestors(entry.id) {
                run[a] = true;
            }
        }
    }

    for entry in table.iter() {
        if entry.kind.is_group() {
            run[entry.id] = table
                .descendants(entry.id)
                .into_iter()
                .any(|d| run[d] && is_leaf(table.nodes[d].kind));
        }
    }

    for entry in table.iter() {
        if let Some(parent) = entry.parent {
            if !entry.kind.is_group() && !entry.kind.is_selectable() {
                run[entry.id] = run[parent];
            }
        }
    }

    let selection = Selection { run };
    debug!(
        running = selection.running().count(),
        nodes = count,
        "selection resolved"
    );
    selection
}

fn is_leaf(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Example | NodeKind::Pending)
}
