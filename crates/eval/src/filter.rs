//! Selection filters read from the environment.
//!
//! | Variable          | Meaning                                            |
//! |-------------------|----------------------------------------------------|
//! | `F`               | space separated source files                       |
//! | `I`               | a single node id                                   |
//! | `L`               | global line numbers, any non-digit separates them  |
//! | `E`               | substring of a describe/context/example text       |
//! | `RDZ_HEXDUMP`     | `1`, `on`, `yes` or `true`: hex dump failed strings |
//! | `RDZ_NO_DURATION` | set: leave timings out of the report               |
//!
//! Only the most specific filter applies: `F`, then `I`, then `L`, then `E`.

use rodzo_table::{NodeId, TableEntry};

/// How a node matched a filter, which decides what else gets to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// The node runs on its own. A group covers its whole subtree.
    Standalone,
    /// The node's descendants run too, unless one of them matched itself.
    Down,
    /// The node's descendants and ancestors run.
    Both,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub files: Vec<String>,
    pub id: Option<NodeId>,
    pub lines: Vec<u32>,
    pub text: Option<String>,
    pub hexdump: bool,
    pub no_duration: bool,
}

impl Filters {
    /// Filters from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Filters from any variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Filters {
            files: get("F")
                .map(|v| v.split(' ').filter(|f| !f.is_empty()).map(String::from).collect())
                .unwrap_or_default(),
            id: get("I").and_then(|v| v.trim().parse().ok()),
            lines: get("L")
                .map(|v| {
                    v.split(|c: char| !c.is_ascii_digit())
                        .filter_map(|n| n.parse().ok())
                        .collect()
                })
                .unwrap_or_default(),
            text: get("E"),
            hexdump: lookup("RDZ_HEXDUMP").is_some_and(|v| truthy(&v)),
            no_duration: lookup("RDZ_NO_DURATION").is_some(),
        }
    }

    /// True when no selection filter is set.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.id.is_none() && self.lines.is_empty() && self.text.is_none()
    }

    /// Pass-one mark of a selectable node, `None` when it does not match.
    pub fn mark(&self, entry: &TableEntry) -> Option<Mark> {
        if !self.files.is_empty() {
            return self.files.contains(&entry.file).then_some(Mark::Standalone);
        }
        if let Some(id) = self.id {
            return (entry.id == id).then_some(Mark::Standalone);
        }
        if !self.lines.is_empty() {
            return self
                .lines
                .iter()
                .any(|&l| entry.covers_line(l))
                .then_some(Mark::Down);
        }
        if let Some(text) = &self.text {
            return (entry.text.is_some() && entry.display_text().contains(text.as_str()))
                .then_some(Mark::Both);
        }
        Some(Mark::Standalone)
    }
}

/// `1`, `on`, `yes` and `true`, in any case.
pub fn truthy(value: &str) -> bool {
    ["1", "on", "yes", "true"]
        .iter()
        .any(|t| value.eq_ignore_ascii_case(t))
}
