//! rodzo-table: the flattened spec node table.
//!
//! The compiler builds a tree of spec nodes; the table is the flat,
//! serialisable view of that tree that every later stage consumes:
//!
//! - rodzo-codegen turns it into the C node-table literal,
//! - rodzo-eval runs the selection and hook engines over it,
//! - the CLI writes it as the `-d` tree dump.
//!
//! Entries are indexed by node id, parents always precede their children.

pub mod kind;
pub mod table;

pub use kind::NodeKind;
pub use table::{unescape, NodeId, NodeTable, TableEntry, TableError, UnitRef};

/// Format version written into serialised tables.
pub const TABLE_FORMAT_VERSION: &str = "1";
