//! External subtitle fetcher boundary.

use super::Language;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Error type for subtitle fetches
#[derive(Debug, Error)]
pub enum FetchError {
    /// Fetcher exited with non-zero status
    #[error("Subtitle fetcher failed with exit code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    /// Fetcher was terminated by signal
    #[error("Subtitle fetcher was terminated by signal")]
    Terminated,

    /// Fetcher-specific failure reported by a non-command implementation
    #[error("{0}")]
    Other(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads subtitles for a media file in one language.
#[async_trait]
pub trait SubtitleFetcher: Send + Sync {
    async fn fetch(&self, file: &Path, language: Language) -> Result<(), FetchError>;
}

/// Fetcher backed by an external program.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: String,
    args: Vec<String>,
}

impl CommandFetcher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// Build the fetcher command: `program [args..] <file> <language>`
pub fn build_fetcher_command(
    program: &str,
    args: &[String],
    file: &Path,
    language: Language,
) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.arg(file).arg(language.code());
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    cmd
}

#[async_trait]
impl SubtitleFetcher for CommandFetcher {
    async fn fetch(&self, file: &Path, language: Language) -> Result<(), FetchError> {
        let output = build_fetcher_command(&self.program, &self.args, file, language)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            match output.status.code() {
                Some(code) => Err(FetchError::Failed {
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }),
                None => Err(FetchError::Terminated),
            }
        }
    }
}
