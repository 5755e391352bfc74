//! rodzo-codegen: emits the self-contained C test program.
//!
//! The generated program embeds the runtime (see `src/prelude/`), the
//! translated spec units and a literal copy of the flattened node table.
//! Compile it with any C99 compiler; no library is needed at link time.

pub mod dump;
pub mod emit;
pub mod error;
pub mod escape;

pub use dump::{dump_paths, pseudo_text, tree_json, write_dumps};
pub use emit::generate;
pub use error::CodegenError;

use std::path::Path;

use rodzo_core::Tree;
use rodzo_table::NodeTable;
use tracing::info;

/// Generate the program for `tree` and write it to `output`.
pub fn write_program(output: &Path, tree: &Tree, table: &NodeTable) -> Result<(), CodegenError> {
    let source = generate(tree, table);
    dump::write_file(output, &source)?;
    info!(path = %output.display(), bytes = source.len(), "program written");
    Ok(())
}
