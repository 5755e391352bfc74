//! Spec tree: an arena of nodes addressed by dense ids.
//!
//! Node ids double as indexes into the arena and into the flattened
//! [`NodeTable`]; they are assigned in pre-order, so a parent always has a
//! smaller id than its children.

use rodzo_table::{NodeId, NodeKind, NodeTable, TableEntry, TableError, UnitRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub text: Option<String>,
    pub source_file: String,
    pub local_line: u32,
    pub global_line: u32,
    pub span_length: u32,
    /// Indentation of the line that opened the node.
    pub indent: usize,
    /// Set once the node's opening `{` has been seen.
    pub has_body: bool,
    /// Verbatim C accumulated for the node. For groups this is file-scope
    /// code, for examples and hooks the function body.
    pub body_text: String,
    /// Assertions translated into `body_text`.
    pub assertions: u32,
    pub children: Vec<NodeId>,
}

impl Node {
    /// Name of the generated C function, for nodes compiled to one.
    ///
    /// Examples marked pending are never invoked and get no unit.
    pub fn unit_name(&self, tree: &Tree) -> Option<String> {
        match self.kind {
            NodeKind::Example if !tree.is_pending_example(self.id) => {
                Some(format!("rdz_example_{}", self.id))
            }
            k if k.is_dispatched_hook() => Some(format!("rdz_hook_{}", self.id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only its root.
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node {
                id: 0,
                parent: None,
                kind: NodeKind::Root,
                text: None,
                source_file: String::new(),
                local_line: 0,
                global_line: 0,
                span_length: 0,
                indent: 0,
                has_body: true,
                body_text: String::new(),
                assertions: 0,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Append a child under `parent` and return its id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        text: Option<String>,
        source_file: &str,
        local_line: u32,
        global_line: u32,
        indent: usize,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            parent: Some(parent),
            kind,
            text,
            source_file: source_file.to_owned(),
            local_line,
            global_line,
            span_length: 0,
            indent,
            has_body: false,
            body_text: String::new(),
            assertions: 0,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes[id]
            .children
            .iter()
            .map(move |&c| &self.nodes[c])
            .filter(move |n| n.kind == kind)
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cur = self.nodes[id].parent;
        while let Some(p) = cur {
            chain.push(p);
            cur = self.nodes[p].parent;
        }
        chain
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    pub fn is_pending_example(&self, id: NodeId) -> bool {
        self.nodes[id].kind == NodeKind::Example
            && self.children_of_kind(id, NodeKind::Pending).next().is_some()
    }

    /// Hooks of `kind` declared on the ancestors of `id`, outermost first.
    pub fn enclosing_hooks(&self, id: NodeId, kind: NodeKind) -> Vec<&Node> {
        let mut chain = self.ancestors(id);
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|g| self.children_of_kind(g, kind))
            .collect()
    }

    /// Flatten into the table shared with the code generator and the runtime.
    pub fn flatten(&self) -> Result<NodeTable, TableError> {
        let entries = self
            .nodes
            .iter()
            .map(|n| TableEntry {
                id: n.id,
                parent: n.parent,
                depth: self.depth(n.id),
                children: n.children.clone(),
                kind: n.kind,
                file: n.source_file.clone(),
                local_line: n.local_line,
                global_line: n.global_line,
                span: n.span_length,
                text: n.text.clone(),
                unit: n.unit_name(self).map(|name| {
                    if n.kind == NodeKind::Example {
                        UnitRef::Example(name)
                    } else {
                        UnitRef::Hook(name)
                    }
                }),
            })
            .collect();
        NodeTable::new(entries)
    }
}
