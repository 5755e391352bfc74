//! Compilation driver: files in, spec tree and node table out.
//!
//! The [`Compiler`] owns the builder state for one run. Files are read
//! through a [`SourceProvider`] and added in the order given, which fixes
//! both node ids and global line numbers.

use std::path::{Path, PathBuf};

use rodzo_table::NodeTable;
use tracing::{info, warn};

use crate::ast::Tree;
use crate::error::CompileError;
use crate::parser::Builder;
use crate::source::{FileSystemProvider, SourceProvider};

/// A finished compilation.
#[derive(Debug)]
pub struct Compilation {
    pub tree: Tree,
    pub table: NodeTable,
    /// Files that could not be read, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

pub struct Compiler<'p> {
    provider: &'p dyn SourceProvider,
    builder: Builder,
    skipped: Vec<(PathBuf, String)>,
}

impl<'p> Compiler<'p> {
    pub fn new(provider: &'p dyn SourceProvider) -> Self {
        Compiler {
            provider,
            builder: Builder::new(),
            skipped: Vec::new(),
        }
    }

    /// Read and add one file. Unreadable files are logged and skipped;
    /// only malformed assertions abort the compilation.
    pub fn add_file(&mut self, path: &Path) -> Result<(), CompileError> {
        match self.provider.read_source(path) {
            Ok(source) => {
                self.builder
                    .add_file(&path.display().to_string(), &source)?;
                Ok(())
            }
            Err(source) => {
                let err = CompileError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                warn!("{}, skipped", err);
                self.skipped.push((path.to_path_buf(), err.to_string()));
                Ok(())
            }
        }
    }

    pub fn finish(self) -> Result<Compilation, CompileError> {
        let tree = self.builder.finish();
        let table = tree.flatten()?;
        info!(nodes = table.len(), "spec tree built");
        Ok(Compilation {
            tree,
            table,
            skipped: self.skipped,
        })
    }
}

/// Compile `paths` with a custom provider.
pub fn compile_with(
    paths: &[PathBuf],
    provider: &dyn SourceProvider,
) -> Result<Compilation, CompileError> {
    let mut compiler = Compiler::new(provider);
    for path in paths {
        compiler.add_file(path)?;
    }
    compiler.finish()
}

/// Compile spec files from disk.
pub fn compile(paths: &[PathBuf]) -> Result<Compilation, CompileError> {
    compile_with(paths, &FileSystemProvider)
}
