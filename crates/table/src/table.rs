//! Flattened node table types, traversal helpers and JSON (de)serialisation.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::kind::NodeKind;
use crate::TABLE_FORMAT_VERSION;

/// Node ids are dense indexes into the table, stable for a whole run.
pub type NodeId = usize;

/// Errors produced while loading or validating a node table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("invalid node table JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported node table format '{0}'")]
    Format(String),

    #[error("node {id}: {reason}")]
    Invalid { id: NodeId, reason: String },
}

/// The callable unit a node compiles to, by generated function name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "name", rename_all = "snake_case")]
pub enum UnitRef {
    /// `void name(int nid)`: an example body with its inline hooks spliced in.
    Example(String),
    /// `void name(void)`: a before/after all or offline hook.
    Hook(String),
}

impl UnitRef {
    pub fn name(&self) -> &str {
        match self {
            UnitRef::Example(name) | UnitRef::Hook(name) => name,
        }
    }
}

/// One node of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    pub depth: usize,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    pub file: String,
    pub local_line: u32,
    pub global_line: u32,
    pub span: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitRef>,
}

impl TableEntry {
    /// True when `line` falls inside `[global_line, global_line + span]`.
    pub fn covers_line(&self, line: u32) -> bool {
        line >= self.global_line && line <= self.global_line.saturating_add(self.span)
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// The text as the compiled program sees it, C escapes resolved.
    pub fn display_text(&self) -> Cow<'_, str> {
        unescape(self.text_or_empty())
    }
}

/// Resolve the escapes of C string literal content.
///
/// Unknown escapes keep the escaped character; octal and `\x` escapes
/// outside the char range are left as written.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('x') => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_hexdigit) {
                    digits.push(d);
                    chars.next();
                }
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(v) => out.push(v),
                    None => {
                        out.push_str("\\x");
                        out.push_str(&digits);
                    }
                }
            }
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|n| n.to_digit(8)) {
                        Some(n) => {
                            value = value * 8 + n;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// The whole flattened tree, entry `i` being node `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTable {
    pub format: String,
    pub nodes: Vec<TableEntry>,
}

impl NodeTable {
    /// Wrap entries into a table, checking the structural invariants.
    pub fn new(nodes: Vec<TableEntry>) -> Result<Self, TableError> {
        let table = NodeTable {
            format: TABLE_FORMAT_VERSION.to_string(),
            nodes,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let table: NodeTable = serde_json::from_str(json)?;
        if table.format != TABLE_FORMAT_VERSION {
            return Err(TableError::Format(table.format));
        }
        table.validate()?;
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&TableEntry> {
        self.nodes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> {
        self.nodes.iter()
    }

    /// The root entry. A validated table always has one at index 0.
    pub fn root(&self) -> &TableEntry {
        &self.nodes[0]
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TableEntry> {
        self.nodes[id].children.iter().map(move |&c| &self.nodes[c])
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cur = self.nodes[id].parent;
        while let Some(p) = cur {
            chain.push(p);
            cur = self.nodes[p].parent;
        }
        chain
    }

    /// All nodes below `id` in declaration order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev().copied());
        }
        out
    }

    /// Hook children of `id` with the given kind, in declaration order.
    pub fn hooks(&self, id: NodeId, kind: NodeKind) -> impl Iterator<Item = &TableEntry> {
        self.children(id).filter(move |c| c.kind == kind)
    }

    /// The description texts from the outermost group down to `id`.
    ///
    /// A pending marker sitting under an example reports the example's path.
    pub fn title_path(&self, id: NodeId) -> Vec<&str> {
        let mut id = id;
        if self.nodes[id].kind == NodeKind::Pending {
            if let Some(p) = self.nodes[id].parent {
                if self.nodes[p].kind == NodeKind::Example {
                    id = p;
                }
            }
        }
        let mut path: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .rev()
            .chain(std::iter::once(id))
            .filter_map(|n| self.nodes[n].text.as_deref())
            .collect();
        path.retain(|t| !t.is_empty());
        path
    }

    /// Space-joined title of a node, as printed in failure listings.
    pub fn title(&self, id: NodeId) -> String {
        unescape(&self.title_path(id).join(" ")).into_owned()
    }

    /// Check the invariants every consumer relies on.
    pub fn validate(&self) -> Result<(), TableError> {
        let invalid = |id: NodeId, reason: &str| TableError::Invalid {
            id,
            reason: reason.to_string(),
        };

        let root = self
            .nodes
            .first()
            .ok_or_else(|| invalid(0, "table is empty"))?;
        if root.kind != NodeKind::Root || root.parent.is_some() {
            return Err(invalid(0, "first entry must be a parentless root"));
        }

        for (index, entry) in self.nodes.iter().enumerate() {
            if entry.id != index {
                return Err(invalid(index, "id does not match its position"));
            }
            if index > 0 {
                let parent = entry
                    .parent
                    .ok_or_else(|| invalid(index, "only the root may lack a parent"))?;
                if parent >= index {
                    return Err(invalid(index, "parent must precede the node"));
                }
                if !self.nodes[parent].children.contains(&index) {
                    return Err(invalid(index, "missing from its parent's children"));
                }
            }
            for &child in &entry.children {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(index) {
                    return Err(invalid(index, "child does not point back to the node"));
                }
            }
            if entry.kind == NodeKind::Pending && !entry.children.is_empty() {
                return Err(invalid(index, "pending nodes cannot have children"));
            }
        }
        Ok(())
    }
}
