//! `rodzo.toml` configuration.
//!
//! Settings are layered: command-line flags win over the config file,
//! which wins over built-in defaults. `CC` and `CFLAGS` in the environment
//! override the file's `[compile]` table.
//!
//! # Example
//!
//! ```toml
//! output = "build/spec.c"
//! suffix = "_spec.c"
//!
//! [compile]
//! cc = "gcc"
//! cflags = "-std=c99 -g -I include"
//! ldflags = "-L lib -lstack"
//! ```

use std::path::{Path, PathBuf};

use rodzo_core::SPEC_SUFFIX;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "rodzo.toml";
pub const DEFAULT_OUTPUT: &str = "spec.c";
pub const DEFAULT_CC: &str = "cc";
pub const DEFAULT_CFLAGS: &str = "-std=c99";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The file as written. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub output: Option<PathBuf>,
    pub suffix: Option<String>,
    pub compile: CompileSection,
}

/// `[compile]` table, used by `-r` and `-V`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileSection {
    pub cc: Option<String>,
    pub cflags: Option<String>,
    pub ldflags: Option<String>,
}

/// Effective settings after layering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output: PathBuf,
    pub suffix: String,
    pub cc: String,
    pub cflags: Vec<String>,
    pub ldflags: Vec<String>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read `path`, or `rodzo.toml` when it exists and no path was given.
pub fn load(path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            if !default.is_file() {
                return Ok(ConfigFile::default());
            }
            default
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}

impl Settings {
    pub fn resolve(
        output: Option<PathBuf>,
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Settings {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let compile = file.compile;

        Settings {
            output: output
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            suffix: file.suffix.unwrap_or_else(|| SPEC_SUFFIX.to_string()),
            cc: env("CC")
                .or(compile.cc)
                .unwrap_or_else(|| DEFAULT_CC.to_string()),
            cflags: words(
                &env("CFLAGS")
                    .or(compile.cflags)
                    .unwrap_or_else(|| DEFAULT_CFLAGS.to_string()),
            ),
            ldflags: words(&compile.ldflags.unwrap_or_default()),
        }
    }

    /// The executable `-r` builds: the output path without its extension.
    pub fn executable(&self) -> PathBuf {
        let exe = self.output.with_extension("");
        if exe.components().count() == 1 {
            Path::new(".").join(exe)
        } else {
            exe
        }
    }
}

fn words(s: &str) -> Vec<String> {
    s.split_whitespace().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let s = Settings::resolve(None, ConfigFile::default(), no_env);
        assert_eq!(s.output, PathBuf::from("spec.c"));
        assert_eq!(s.suffix, "_spec.c");
        assert_eq!(s.cc, "cc");
        assert_eq!(s.cflags, vec!["-std=c99"]);
        assert!(s.ldflags.is_empty());
        assert_eq!(s.executable(), PathBuf::from("./spec"));
    }

    #[test]
    fn flags_beat_file_and_env_beats_compile_table() {
        let file: ConfigFile = toml::from_str(
            r#"
output = "build/all.c"
suffix = "_test.c"

[compile]
cc = "gcc"
cflags = "-O0 -g"
ldflags = "-lm"
"#,
        )
        .unwrap();

        let s = Settings::resolve(Some("mine.c".into()), file.clone(), |k| {
            (k == "CC").then(|| "clang".to_string())
        });
        assert_eq!(s.output, PathBuf::from("mine.c"));
        assert_eq!(s.suffix, "_test.c");
        assert_eq!(s.cc, "clang");
        assert_eq!(s.cflags, vec!["-O0", "-g"]);
        assert_eq!(s.ldflags, vec!["-lm"]);

        let s = Settings::resolve(None, file, no_env);
        assert_eq!(s.executable(), PathBuf::from("build/all"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = toml::from_str::<ConfigFile>("outptu = \"x.c\"\n").unwrap_err();
        assert!(err.to_string().contains("outptu"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/rodzo.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rodzo.toml"));
    }
}
