//! rodzo-core: the spec compiler front end.
//!
//! Turns `*_spec.c` files written in the describe/context/it DSL into a
//! spec tree:
//!
//! - [`lexer`] classifies physical lines,
//! - [`parser`] builds the tree from classified lines,
//! - [`assertion`] translates `ensure(...)` statements into C blocks,
//! - [`compile`] drives a whole run and flattens the tree into a
//!   [`NodeTable`](rodzo_table::NodeTable).

pub mod assertion;
pub mod ast;
pub mod compile;
pub mod discover;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod source;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{Node, Tree};
pub use compile::{compile, compile_with, Compilation, Compiler};
pub use discover::{discover_spec_files, SPEC_SUFFIX};
pub use error::CompileError;
pub use parser::Builder;
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};

pub use rodzo_table::{NodeId, NodeKind, NodeTable};
