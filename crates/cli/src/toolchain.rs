//! Building and running the generated program (`-r`, `-V`).

use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::{debug, info};

use crate::config::Settings;

#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("could not start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' failed with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// `cc <cflags> -o <exe> <source> <ldflags>`.
pub fn compile_command(settings: &Settings) -> Command {
    let mut cmd = Command::new(&settings.cc);
    cmd.args(&settings.cflags)
        .arg("-o")
        .arg(settings.executable())
        .arg(&settings.output)
        .args(&settings.ldflags);
    cmd
}

/// The program itself, or `valgrind --leak-check=full <program>`.
pub fn run_command(executable: &Path, valgrind: bool) -> Command {
    if valgrind {
        let mut cmd = Command::new("valgrind");
        cmd.arg("--leak-check=full").arg(executable);
        cmd
    } else {
        Command::new(executable)
    }
}

/// Compile the generated source. A failing compiler is an error.
pub fn compile(settings: &Settings) -> Result<(), ToolchainError> {
    let mut cmd = compile_command(settings);
    info!(command = ?cmd, "compiling");
    let status = status(&mut cmd, &settings.cc)?;
    if !status.success() {
        return Err(ToolchainError::Failed {
            program: settings.cc.clone(),
            status,
        });
    }
    Ok(())
}

/// Run the compiled program and return its exit code. The program's own
/// failures are reported through its output and exit status, not as errors.
pub fn run(settings: &Settings, valgrind: bool) -> Result<i32, ToolchainError> {
    let executable = settings.executable();
    let mut cmd = run_command(&executable, valgrind);
    info!(command = ?cmd, "running specs");
    let program = cmd.get_program().to_string_lossy().into_owned();
    let status = status(&mut cmd, &program)?;
    debug!(%status, "spec program exited");
    Ok(status.code().unwrap_or(1))
}

fn status(cmd: &mut Command, program: &str) -> Result<ExitStatus, ToolchainError> {
    cmd.status().map_err(|source| ToolchainError::Spawn {
        program: program.to_string(),
        source,
    })
}
