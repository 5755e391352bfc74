use std::path::PathBuf;

/// A compilation error, carrying the file and line it was raised on where
/// one is known.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}:{line}: {message}")]
    Syntax {
        file: String,
        line: u32,
        message: String,
    },

    #[error("no spec files found under {}", .0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    NoInput(Vec<PathBuf>),

    #[error(transparent)]
    Table(#[from] rodzo_table::TableError),
}

impl CompileError {
    pub fn syntax(file: &str, line: u32, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }
}
