//! External mover boundary.
//!
//! The mover relocates a media file into the library and reports where it
//! ended up. The production implementation shells out to a configured
//! program invoked as `program [args..] <source> <dest_dir>` and reads the
//! destination path from the last non-empty line of its stdout.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Error type for move operations
#[derive(Debug, Error)]
pub enum MoveError {
    /// Mover process exited with non-zero status
    #[error("Mover failed with exit code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    /// Mover process was terminated by signal
    #[error("Mover process was terminated by signal")]
    Terminated,

    /// IO error spawning or talking to the mover
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Relocates a file into a destination directory.
///
/// `Ok(None)` means the mover finished without reporting a destination, which
/// callers treat like a failed move. Implementations must tolerate a source
/// that no longer exists by returning an error.
#[async_trait]
pub trait Mover: Send + Sync {
    async fn move_file(&self, source: &Path, dest_dir: &Path)
        -> Result<Option<PathBuf>, MoveError>;
}

/// Mover backed by an external program.
#[derive(Debug, Clone)]
pub struct CommandMover {
    program: String,
    args: Vec<String>,
}

impl CommandMover {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// Build the mover command: `program [args..] <source> <dest_dir>`
pub fn build_mover_command(
    program: &str,
    args: &[String],
    source: &Path,
    dest_dir: &Path,
) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.arg(source).arg(dest_dir);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

/// Extract the reported destination from mover stdout.
pub fn parse_destination(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

#[async_trait]
impl Mover for CommandMover {
    async fn move_file(
        &self,
        source: &Path,
        dest_dir: &Path,
    ) -> Result<Option<PathBuf>, MoveError> {
        let output = build_mover_command(&self.program, &self.args, source, dest_dir)
            .output()
            .await?;

        if !output.status.success() {
            return match output.status.code() {
                Some(code) => Err(MoveError::Failed {
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }),
                None => Err(MoveError::Terminated),
            };
        }

        Ok(parse_destination(&String::from_utf8_lossy(&output.stdout)))
    }
}
