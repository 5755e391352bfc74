//! Node kinds of the spec tree.

use serde::{Deserialize, Serialize};

/// What a node in the spec tree stands for.
///
/// Every phase (building, code generation, selection, execution) matches
/// on this enum instead of dispatching through per-kind tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    FileGroup,
    Describe,
    Context,
    Example,
    Pending,
    BeforeEach,
    BeforeAll,
    AfterEach,
    AfterAll,
    BeforeEachOffline,
    AfterEachOffline,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Root,
        NodeKind::FileGroup,
        NodeKind::Describe,
        NodeKind::Context,
        NodeKind::Example,
        NodeKind::Pending,
        NodeKind::BeforeEach,
        NodeKind::BeforeAll,
        NodeKind::AfterEach,
        NodeKind::AfterAll,
        NodeKind::BeforeEachOffline,
        NodeKind::AfterEachOffline,
    ];

    /// Root, file groups, describes and contexts.
    pub fn is_group(self) -> bool {
        matches!(
            self,
            NodeKind::Root | NodeKind::FileGroup | NodeKind::Describe | NodeKind::Context
        )
    }

    pub fn is_hook(self) -> bool {
        matches!(
            self,
            NodeKind::BeforeEach
                | NodeKind::BeforeAll
                | NodeKind::AfterEach
                | NodeKind::AfterAll
                | NodeKind::BeforeEachOffline
                | NodeKind::AfterEachOffline
        )
    }

    /// Hooks whose text is spliced into every covered example at compile time.
    pub fn is_inline_hook(self) -> bool {
        matches!(self, NodeKind::BeforeEach | NodeKind::AfterEach)
    }

    /// Hooks compiled into their own function and dispatched at run time.
    pub fn is_dispatched_hook(self) -> bool {
        self.is_hook() && !self.is_inline_hook()
    }

    /// Kinds the selection filters look at. These are also the only kinds
    /// that carry a description text in the table.
    pub fn is_selectable(self) -> bool {
        matches!(
            self,
            NodeKind::Describe | NodeKind::Context | NodeKind::Example | NodeKind::Pending
        )
    }

    /// Single-character tag used in the generated C node table.
    pub fn tag(self) -> char {
        match self {
            NodeKind::Root => 'r',
            NodeKind::FileGroup => 'g',
            NodeKind::Describe => 'd',
            NodeKind::Context => 'c',
            NodeKind::Example => 'i',
            NodeKind::Pending => 'p',
            NodeKind::BeforeEach => 'b',
            NodeKind::BeforeAll => 'B',
            NodeKind::AfterEach => 'a',
            NodeKind::AfterAll => 'A',
            NodeKind::BeforeEachOffline => 'o',
            NodeKind::AfterEachOffline => 'O',
        }
    }

    pub fn from_tag(tag: char) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// The DSL spelling of the kind, used for hook labels and dumps.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::FileGroup => "file",
            NodeKind::Describe => "describe",
            NodeKind::Context => "context",
            NodeKind::Example => "it",
            NodeKind::Pending => "pending",
            NodeKind::BeforeEach => "before each",
            NodeKind::BeforeAll => "before all",
            NodeKind::AfterEach => "after each",
            NodeKind::AfterAll => "after all",
            NodeKind::BeforeEachOffline => "before each offline",
            NodeKind::AfterEachOffline => "after each offline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique_and_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(NodeKind::from_tag('z'), None);
    }

    #[test]
    fn hook_classes_partition_hooks() {
        for kind in NodeKind::ALL {
            if kind.is_hook() {
                assert_ne!(kind.is_inline_hook(), kind.is_dispatched_hook());
            } else {
                assert!(!kind.is_inline_hook() && !kind.is_dispatched_hook());
            }
        }
        assert!(NodeKind::BeforeAll.is_dispatched_hook());
        assert!(NodeKind::AfterEach.is_inline_hook());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&NodeKind::BeforeEachOffline).unwrap();
        assert_eq!(json, "\"before_each_offline\"");
    }
}
