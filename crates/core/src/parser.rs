//! Tree builder.
//!
//! Consumes classified lines and grows the spec tree under a cursor. Only
//! lines whose head is a DSL keyword (or a brace matching a DSL block) are
//! structural; everything else is C and is appended verbatim to the body of
//! the node under the cursor.
//!
//! Structure follows braces where they are present and indentation where
//! they are not: a node opened without a `{` stays open for deeper indented
//! lines and is closed by the next line at or left of its own indentation.

use rodzo_table::{NodeId, NodeKind};
use tracing::{debug, warn};

use crate::assertion::{Assertion, DONE_LABEL, OVER_LABEL};
use crate::ast::Tree;
use crate::error::CompileError;
use crate::lexer::{split_statements, statement_complete, ClassifiedLine, Scanner};

/// Reason given to an example that never got a body.
pub const NOT_IMPLEMENTED: &str = "not yet implemented";
/// Reason given to a `pending` marker without a quoted text.
pub const NO_REASON: &str = "no reason given";

/// Builds one tree out of any number of files, in the order they are added.
#[derive(Debug, Default)]
pub struct Builder {
    tree: Tree,
    cursor: NodeId,
    file: String,
    line_offset: u32,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total physical lines of the files added so far.
    pub fn line_offset(&self) -> u32 {
        self.line_offset
    }

    /// Add one file as a new file group under the root.
    pub fn add_file(&mut self, file: &str, source: &str) -> Result<NodeId, CompileError> {
        let lines: Vec<&str> = source.lines().collect();
        let line_count = lines.len() as u32;

        let group = self.tree.add_child(
            self.tree.root(),
            NodeKind::FileGroup,
            None,
            file,
            1,
            self.line_offset + 1,
            0,
        );
        self.tree.node_mut(group).has_body = true;
        self.cursor = group;
        self.file = file.to_owned();

        let mut scanner = Scanner::new();
        let mut index = 0usize;
        while index < lines.len() {
            let lnum = index as u32 + 1;
            let line = scanner.classify(lines[index]);
            index += 1;

            if line.is_hidden() {
                continue;
            }

            match line.head.as_str() {
                "ensure" | "expect" if line.code[line.head.len()..].trim_start().starts_with('(') => {
                    let mut statement = line.code[line.head.len()..].to_string();
                    let mut raw = line.raw.clone();
                    while !statement_complete(&statement) && index < lines.len() {
                        let next = scanner.classify(lines[index]);
                        index += 1;
                        statement.push('\n');
                        statement.push_str(&next.code);
                        raw.push('\n');
                        raw.push_str(&next.raw);
                    }
                    if !statement_complete(&statement) {
                        return Err(CompileError::syntax(
                            file,
                            lnum,
                            format!("unterminated {} statement", line.head),
                        ));
                    }
                    self.assertion(&line, lnum, &statement, &raw);
                }
                _ => self.line(&line, lnum),
            }
        }

        self.close_to_group(line_count);
        self.tree.node_mut(group).span_length = line_count.saturating_sub(1);
        self.line_offset += line_count;
        debug!(file, lines = line_count, "file added to spec tree");
        Ok(group)
    }

    pub fn finish(self) -> Tree {
        self.tree
    }

    fn line(&mut self, line: &ClassifiedLine, lnum: u32) {
        if line.is_blank() {
            self.verbatim(&line.raw);
            return;
        }

        match line.head.as_str() {
            "{" => self.open_brace(line, lnum),
            "}" => self.close_brace(line, lnum),
            "describe" if line.text.is_some() => {
                self.open(NodeKind::Describe, line.text.clone(), line, lnum)
            }
            "context" if line.text.is_some() => {
                self.open(NodeKind::Context, line.text.clone(), line, lnum)
            }
            "it" | "they" if line.text.is_some() => {
                self.open(NodeKind::Example, line.text.clone(), line, lnum)
            }
            "before" | "after" => match hook_kind(line) {
                Some(kind) => self.open(kind, None, line, lnum),
                None => self.code_line(line, lnum),
            },
            "pending" => self.pending(line, lnum),
            _ => self.code_line(line, lnum),
        }
    }

    // ──────────────────────────────────────────────
    // Structure
    // ──────────────────────────────────────────────

    fn open(&mut self, kind: NodeKind, text: Option<String>, line: &ClassifiedLine, lnum: u32) {
        self.auto_close(line.indent, lnum);
        if !self.tree.node(self.cursor).kind.is_group() {
            self.verbatim(&line.raw);
            return;
        }
        let id = self.add_node(self.cursor, kind, text, line, lnum);
        self.cursor = id;
        debug!(id, kind = kind.label(), line = lnum, "opened node");
        self.body_on_line(line, lnum);
    }

    /// Code after a `{` on the opening line belongs to the node under the
    /// cursor, which is closed right away when its `}` follows on that line.
    fn body_on_line(&mut self, line: &ClassifiedLine, lnum: u32) {
        let Some(body) = line.body_on_line() else {
            return;
        };
        self.tree.node_mut(self.cursor).has_body = true;

        let indent = format!("{}  ", &line.raw[..line.indent]);
        for statement in split_statements(body.content) {
            let inner = Scanner::new().classify(statement);
            let rest = &statement[inner.head.len()..];
            match inner.head.as_str() {
                "ensure" | "expect" if rest.trim_start().starts_with('(') => {
                    self.push_assertion(&inner.head, &indent, lnum, rest, statement);
                }
                "pending" if self.tree.node(self.cursor).kind == NodeKind::Example => {
                    self.mark_pending(inner.text, line, lnum);
                }
                _ => self.verbatim(&format!("{}{}", indent, statement)),
            }
        }

        if body.closed {
            self.close_current(lnum);
        }
    }

    fn open_brace(&mut self, line: &ClassifiedLine, lnum: u32) {
        self.auto_close(line.indent + 1, lnum);
        if self.awaiting_body(self.cursor) {
            self.tree.node_mut(self.cursor).has_body = true;
        } else {
            self.verbatim(&line.raw);
        }
    }

    fn close_brace(&mut self, line: &ClassifiedLine, lnum: u32) {
        self.auto_close(line.indent, lnum);
        let node = self.tree.node(self.cursor);
        if is_dsl(node.kind) && node.has_body && line.indent <= node.indent {
            self.close_current(lnum);
        } else {
            self.verbatim(&line.raw);
        }
    }

    fn pending(&mut self, line: &ClassifiedLine, lnum: u32) {
        self.auto_close(line.indent, lnum);
        let cursor = self.cursor;
        let kind = self.tree.node(cursor).kind;

        if kind == NodeKind::Example {
            self.mark_pending(line.text.clone(), line, lnum);
        } else if kind.is_group() {
            let text = line.text.clone().unwrap_or_default();
            let id = self.add_node(cursor, NodeKind::Example, Some(text), line, lnum);
            self.add_node(id, NodeKind::Pending, Some(NO_REASON.to_string()), line, lnum);
            self.cursor = id;
            self.body_on_line(line, lnum);
        } else {
            self.verbatim(&line.raw);
        }
    }

    fn mark_pending(&mut self, reason: Option<String>, line: &ClassifiedLine, lnum: u32) {
        let cursor = self.cursor;
        if !self.tree.is_pending_example(cursor) {
            let reason = reason.unwrap_or_else(|| NO_REASON.to_string());
            self.add_node(cursor, NodeKind::Pending, Some(reason), line, lnum);
        }
    }

    /// Close nodes still waiting for their `{` that sit at or right of
    /// `indent`.
    fn auto_close(&mut self, indent: usize, lnum: u32) {
        while self.awaiting_body(self.cursor) && self.tree.node(self.cursor).indent >= indent {
            self.close_current(lnum.saturating_sub(1));
        }
    }

    fn close_to_group(&mut self, last_line: u32) {
        while is_dsl(self.tree.node(self.cursor).kind) {
            self.close_current(last_line);
        }
    }

    fn close_current(&mut self, end_line: u32) {
        let id = self.cursor;
        let node = self.tree.node(id);
        if !is_dsl(node.kind) {
            return;
        }
        let (kind, has_body, local_line) = (node.kind, node.has_body, node.local_line);
        let parent = node.parent.unwrap_or(0);

        if kind == NodeKind::Example && !has_body && !self.tree.is_pending_example(id) {
            let node = self.tree.node(id);
            let (file, global, indent) = (node.source_file.clone(), node.global_line, node.indent);
            self.tree.add_child(
                id,
                NodeKind::Pending,
                Some(NOT_IMPLEMENTED.to_string()),
                &file,
                local_line,
                global,
                indent,
            );
        }

        self.tree.node_mut(id).span_length = end_line.saturating_sub(local_line);
        self.cursor = parent;
    }

    fn awaiting_body(&self, id: NodeId) -> bool {
        let node = self.tree.node(id);
        is_dsl(node.kind) && !node.has_body
    }

    fn add_node(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        text: Option<String>,
        line: &ClassifiedLine,
        lnum: u32,
    ) -> NodeId {
        let file = self.file.clone();
        self.tree.add_child(
            parent,
            kind,
            text,
            &file,
            lnum,
            self.line_offset + lnum,
            line.indent,
        )
    }

    // ──────────────────────────────────────────────
    // Bodies
    // ──────────────────────────────────────────────

    fn code_line(&mut self, line: &ClassifiedLine, lnum: u32) {
        self.auto_close(line.indent, lnum);
        self.verbatim(&line.raw);
    }

    fn assertion(&mut self, line: &ClassifiedLine, lnum: u32, statement: &str, raw: &str) {
        self.auto_close(line.indent, lnum);
        self.push_assertion(&line.head, &line.raw[..line.indent], lnum, statement, raw);
    }

    fn push_assertion(&mut self, head: &str, indent: &str, lnum: u32, statement: &str, raw: &str) {
        let kind = self.tree.node(self.cursor).kind;
        if kind != NodeKind::Example && !kind.is_hook() {
            warn!(
                file = %self.file,
                line = lnum,
                "{} outside of an example or hook, kept as is",
                head
            );
            self.verbatim(raw);
            return;
        }

        let label = if kind == NodeKind::AfterEach {
            DONE_LABEL
        } else {
            OVER_LABEL
        };
        let assertion = Assertion::parse(statement, lnum, self.line_offset + lnum);
        let c = assertion.to_c(indent, label);

        let node = self.tree.node_mut(self.cursor);
        node.body_text.push_str(&c);
        node.assertions += 1;
    }

    fn verbatim(&mut self, raw: &str) {
        let body = &mut self.tree.node_mut(self.cursor).body_text;
        body.push_str(raw);
        body.push('\n');
    }
}

// -- Helpers --

/// Nodes opened by a DSL keyword, as opposed to the root and file groups.
fn is_dsl(kind: NodeKind) -> bool {
    !matches!(kind, NodeKind::Root | NodeKind::FileGroup)
}

/// `before`/`after` followed only by `each`, `all` and `offline` words.
fn hook_kind(line: &ClassifiedLine) -> Option<NodeKind> {
    let words = line.words_after_head();
    if !words
        .iter()
        .all(|w| matches!(*w, "each" | "all" | "offline"))
    {
        return None;
    }
    let all = words.contains(&"all");
    let offline = words.contains(&"offline");
    Some(match (line.head.as_str(), all, offline) {
        ("before", true, _) => NodeKind::BeforeAll,
        ("before", false, true) => NodeKind::BeforeEachOffline,
        ("before", false, false) => NodeKind::BeforeEach,
        (_, true, _) => NodeKind::AfterAll,
        (_, false, true) => NodeKind::AfterEachOffline,
        (_, false, false) => NodeKind::AfterEach,
    })
}
