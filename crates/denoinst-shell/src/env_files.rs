use std::path::Path;

use denoinst_platform::System;
use log::{debug, warn};

use crate::error::ShellSetupError;
use crate::script::ShellScript;
use crate::shells::UnixShell;

pub struct EnvFilesResult {
    /// Shells whose env script is in place.
    pub configured: Vec<Box<dyn UnixShell>>,
    /// Shells whose env script could not be written for lack of permission.
    pub dropped: Vec<Box<dyn UnixShell>>,
    /// Scripts physically written, one per distinct script.
    pub written: Vec<ShellScript>,
}

/// Write the env script of every shell into `install_dir`.
///
/// Shells producing identical scripts share a single write. A shell whose
/// script cannot be written because permission was denied is dropped, since
/// there would be nothing for its rc files to source.
pub async fn write_env_files(
    system: &dyn System,
    shells: Vec<Box<dyn UnixShell>>,
    install_dir: &Path,
) -> Result<EnvFilesResult, ShellSetupError> {
    let mut written: Vec<ShellScript> = Vec::new();
    let mut denied: Vec<ShellScript> = Vec::new();
    let mut configured = Vec::with_capacity(shells.len());
    let mut dropped = Vec::new();

    for shell in shells {
        let script = shell.env_script(install_dir);

        if written.contains(&script) {
            debug!("{} shares the {} script already written", shell.name(), script.name);
            configured.push(shell);
            continue;
        }

        if !denied.contains(&script) && script.write(system, install_dir).await? {
            written.push(script);
            configured.push(shell);
            continue;
        }

        warn!(
            "Not allowed to write {} into {}, skipping {}",
            script.name,
            install_dir.display(),
            shell.name()
        );
        if !denied.contains(&script) {
            denied.push(script);
        }
        dropped.push(shell);
    }

    Ok(EnvFilesResult {
        configured,
        dropped,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shells::{Bash, Fish, Posix, Zsh};
    use denoinst_platform::MemorySystem;
    use std::sync::Arc;

    fn names(shells: &[Box<dyn UnixShell>]) -> Vec<&'static str> {
        shells.iter().map(|shell| shell.name()).collect()
    }

    #[tokio::test]
    async fn identical_scripts_are_written_once() {
        let memory = Arc::new(MemorySystem::new("/home/u").with_dir("/home/u/.deno"));
        let system: Arc<dyn System> = memory.clone();
        let shells: Vec<Box<dyn UnixShell>> = vec![
            Box::new(Bash::new(Arc::clone(&system))),
            Box::new(Zsh::new(Arc::clone(&system))),
        ];

        let result = write_env_files(system.as_ref(), shells, Path::new("/home/u/.deno"))
            .await
            .unwrap();

        assert_eq!(names(&result.configured), ["bash", "zsh"]);
        assert!(result.dropped.is_empty());
        assert_eq!(memory.writes(), [Path::new("/home/u/.deno/env")]);
    }

    #[tokio::test]
    async fn fish_gets_its_own_script() {
        let memory = Arc::new(MemorySystem::new("/home/u").with_dir("/home/u/.deno"));
        let system: Arc<dyn System> = memory.clone();
        let shells: Vec<Box<dyn UnixShell>> = vec![
            Box::new(Posix::new(Arc::clone(&system))),
            Box::new(Fish::new(Arc::clone(&system))),
        ];

        let result = write_env_files(system.as_ref(), shells, Path::new("/home/u/.deno"))
            .await
            .unwrap();

        assert_eq!(result.written.len(), 2);
        assert!(memory.file("/home/u/.deno/env").is_some());
        assert!(memory.file("/home/u/.deno/env.fish").is_some());
    }

    #[tokio::test]
    async fn permission_denied_drops_every_shell_sharing_the_script() {
        let memory = Arc::new(
            MemorySystem::new("/home/u")
                .with_dir("/opt/deno")
                .with_protected("/opt/deno/env"),
        );
        let system: Arc<dyn System> = memory.clone();
        let shells: Vec<Box<dyn UnixShell>> = vec![
            Box::new(Posix::new(Arc::clone(&system))),
            Box::new(Zsh::new(Arc::clone(&system))),
            Box::new(Fish::new(Arc::clone(&system))),
        ];

        let result = write_env_files(system.as_ref(), shells, Path::new("/opt/deno"))
            .await
            .unwrap();

        assert_eq!(names(&result.configured), ["fish"]);
        assert_eq!(names(&result.dropped), ["sh", "zsh"]);
        assert_eq!(memory.writes(), [Path::new("/opt/deno/env.fish")]);
    }
}
