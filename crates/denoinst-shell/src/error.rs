use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellSetupError {
    #[error("Failed to write {name} file to {}: {source}", path.display())]
    EnvScript {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to update shell rc file {}: {source}", path.display())]
    RcFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to back up {} to {}: {source}", path.display(), dest.display())]
    Backup {
        path: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to check {}: {source}", path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run {program}: {source}")]
    RunCommand {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("deno completions subcommand failed for {shell}, stderr was: {stderr}")]
    CompletionCommand { shell: String, stderr: String },

    #[error("Failed to write completion file {}: {source}", path.display())]
    CompletionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShellSetupError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn create_dir(path: &Path, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn probe(path: &Path, source: std::io::Error) -> Self {
        Self::Probe {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn run(program: &Path, source: std::io::Error) -> Self {
        Self::RunCommand {
            program: program.display().to_string(),
            source,
        }
    }
}
