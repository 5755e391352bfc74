//! `-d` debug artifacts written next to the generated program.

use std::path::{Path, PathBuf};

use rodzo_core::{NodeKind, Tree};
use rodzo_table::NodeTable;
use tracing::debug;

use crate::error::CodegenError;

/// Paths of the two artifacts for an output path: `<stem>.tree.json` and
/// `<stem>.pseudo.txt`, in the output's directory.
pub fn dump_paths(output: &Path) -> (PathBuf, PathBuf) {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "spec".to_string());
    let dir = output.parent().unwrap_or_else(|| Path::new(""));
    (
        dir.join(format!("{}.tree.json", stem)),
        dir.join(format!("{}.pseudo.txt", stem)),
    )
}

/// The flattened table as pretty JSON, with the list of source files.
pub fn tree_json(tree: &Tree, table: &NodeTable) -> Result<String, CodegenError> {
    let files: Vec<&str> = tree
        .iter()
        .filter(|n| n.kind == NodeKind::FileGroup)
        .map(|n| n.source_file.as_str())
        .collect();
    let value = serde_json::json!({
        "files": files,
        "table": table,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// An indented outline of the tree: one line per node with its origin and
/// unit name, followed by its body text.
pub fn pseudo_text(tree: &Tree) -> String {
    let mut out = String::new();
    for node in tree.iter() {
        let depth = tree.depth(node.id);
        let pad = "  ".repeat(depth);

        out.push_str(&pad);
        out.push_str(node.kind.label());
        if let Some(text) = &node.text {
            out.push_str(&format!(" \"{}\"", text));
        }
        if node.kind != NodeKind::Root {
            out.push_str(&format!(
                " {}:{} [{}..{}]",
                node.source_file,
                node.local_line,
                node.global_line,
                node.global_line + node.span_length
            ));
        }
        if let Some(unit) = node.unit_name(tree) {
            out.push_str(&format!(" -> {}", unit));
        }
        out.push('\n');

        for line in node.body_text.lines() {
            out.push_str(&pad);
            out.push_str("  | ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Write both artifacts and return their paths.
pub fn write_dumps(
    output: &Path,
    tree: &Tree,
    table: &NodeTable,
) -> Result<(PathBuf, PathBuf), CodegenError> {
    let (json_path, pseudo_path) = dump_paths(output);
    write_file(&json_path, &tree_json(tree, table)?)?;
    write_file(&pseudo_path, &pseudo_text(tree))?;
    debug!(json = %json_path.display(), pseudo = %pseudo_path.display(), "debug dumps written");
    Ok((json_path, pseudo_path))
}

pub(crate) fn write_file(path: &Path, content: &str) -> Result<(), CodegenError> {
    std::fs::write(path, content).map_err(|source| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    })
}
