//! The supported shell dialects.
//!
//! Every dialect implements [`UnixShell`]. The env script and the command
//! sourcing it default to the POSIX forms in [`crate::script`]; only fish
//! overrides them.

mod bash;
mod fish;
mod posix;
mod zsh;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use denoinst_platform::System;

use crate::error::ShellSetupError;
use crate::rc_file::RcUpdate;
use crate::script::{ShellScript, sh_env_script, sh_source_string};

pub use bash::Bash;
pub use fish::Fish;
pub use posix::Posix;
pub use zsh::Zsh;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    #[serde(rename = "sh")]
    Posix,
    Bash,
    Zsh,
    Fish,
}

impl ShellKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ShellKind::Posix => "sh",
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether deno ships completions for a shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSupport {
    Unsupported,
    Supported,
    /// Offered, but shown to the user with this note.
    Discouraged(&'static str),
}

impl CompletionSupport {
    #[must_use]
    pub fn is_supported(self) -> bool {
        !matches!(self, CompletionSupport::Unsupported)
    }

    #[must_use]
    pub fn note(self) -> Option<&'static str> {
        match self {
            CompletionSupport::Discouraged(note) => Some(note),
            _ => None,
        }
    }
}

#[async_trait]
pub trait UnixShell: Send + Sync {
    fn kind(&self) -> ShellKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn supports_completion(&self) -> CompletionSupport;

    /// Is the shell present on this machine?
    async fn exists(&self) -> Result<bool, ShellSetupError>;

    /// Every config file the shell might read.
    async fn rc_files(&self) -> Result<Vec<PathBuf>, ShellSetupError>;

    /// The config files that should actually be edited.
    async fn rcs_to_update(&self) -> Result<Vec<PathBuf>, ShellSetupError>;

    /// Script that puts the install's `bin` directory on PATH.
    fn env_script(&self, install_dir: &Path) -> ShellScript {
        sh_env_script(install_dir)
    }

    /// Command that sources [`UnixShell::env_script`].
    fn source_string(&self, install_dir: &Path) -> String {
        sh_source_string(install_dir)
    }

    async fn completions_file_path(&self) -> Result<Option<PathBuf>, ShellSetupError> {
        Ok(None)
    }

    /// What has to go into the rc files to activate completions.
    async fn completions_source_string(&self) -> Result<Option<RcUpdate>, ShellSetupError> {
        Ok(None)
    }
}

/// All supported shells, in the order they are set up.
#[must_use]
pub fn all_shells(system: &Arc<dyn System>) -> Vec<Box<dyn UnixShell>> {
    vec![
        Box::new(Posix::new(Arc::clone(system))),
        Box::new(Bash::new(Arc::clone(system))),
        Box::new(Zsh::new(Arc::clone(system))),
        Box::new(Fish::new(Arc::clone(system))),
    ]
}

/// Keep the candidates that exist as files, preserving their order.
/// The probes run concurrently.
pub(crate) async fn existing_files(
    system: &dyn System,
    candidates: Vec<PathBuf>,
) -> Result<Vec<PathBuf>, ShellSetupError> {
    let probes = candidates.iter().map(|candidate| async move {
        system
            .is_existing_file(candidate)
            .await
            .map_err(|error| ShellSetupError::probe(candidate, error))
    });
    let exists = try_join_all(probes).await?;

    Ok(candidates
        .into_iter()
        .zip(exists)
        .filter_map(|(candidate, exists)| exists.then_some(candidate))
        .collect())
}

/// Whether `$SHELL` mentions `needle`.
pub(crate) fn shell_env_contains(system: &dyn System, needle: &str) -> bool {
    system
        .env_var("SHELL")
        .is_some_and(|shell| shell.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use denoinst_platform::MemorySystem;

    fn system(memory: MemorySystem) -> Arc<dyn System> {
        Arc::new(memory)
    }

    #[test]
    fn registry_order_is_fixed() {
        let system = system(MemorySystem::new("/home/u"));
        let names: Vec<_> = all_shells(&system).iter().map(|s| s.name()).collect();
        assert_eq!(names, ["sh", "bash", "zsh", "fish"]);
    }

    #[tokio::test]
    async fn existing_files_keeps_candidate_order() {
        let memory = MemorySystem::new("/home/u")
            .with_file("/home/u/c", "")
            .with_file("/home/u/a", "");
        let found = existing_files(
            &memory,
            vec!["/home/u/a".into(), "/home/u/b".into(), "/home/u/c".into()],
        )
        .await
        .expect("probe");

        assert_eq!(found, [PathBuf::from("/home/u/a"), PathBuf::from("/home/u/c")]);
    }

    #[tokio::test]
    async fn existing_files_propagates_probe_errors() {
        let memory = MemorySystem::new("/home/u").with_failing("/home/u/b");
        let result = existing_files(&memory, vec!["/home/u/a".into(), "/home/u/b".into()]).await;

        assert!(matches!(result, Err(ShellSetupError::Probe { .. })));
    }

    #[test]
    fn shell_env_matching_is_substring_based() {
        let memory = MemorySystem::new("/home/u").with_env("SHELL", "/usr/local/bin/zsh");
        assert!(shell_env_contains(&memory, "zsh"));
        assert!(!shell_env_contains(&memory, "fish"));
        assert!(!shell_env_contains(&MemorySystem::new("/home/u"), "zsh"));
    }

    #[test]
    fn completion_support_notes() {
        assert!(!CompletionSupport::Unsupported.is_supported());
        assert!(CompletionSupport::Supported.is_supported());
        let discouraged = CompletionSupport::Discouraged("not recommended on macOS");
        assert!(discouraged.is_supported());
        assert_eq!(discouraged.note(), Some("not recommended on macOS"));
    }
}
