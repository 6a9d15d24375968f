use serde::Serialize;
use std::io;
use std::path::Path;

use denoinst_platform::{System, is_permission_denied};
use log::{info, warn};

use crate::backup::Backups;
use crate::error::ShellSetupError;
use crate::rc_file::update_rc_file;
use crate::report::RcFileChange;
use crate::shells::UnixShell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    Written,
    UpToDate,
    Failed,
    Unsupported,
}

impl CompletionOutcome {
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, CompletionOutcome::Failed)
    }
}

/// Generate completion files with `deno completions <shell>` and write them
/// where each shell looks for them. Files whose contents already match are
/// left alone.
///
/// The completions subcommand failing is an error for the whole run: it
/// means the installed binary is broken. Empty output only fails that shell.
pub async fn write_completion_files(
    system: &dyn System,
    shells: &[&dyn UnixShell],
    deno: &Path,
) -> Result<Vec<CompletionOutcome>, ShellSetupError> {
    let mut results = Vec::with_capacity(shells.len());
    for shell in shells {
        results.push(write_completion_file(system, *shell, deno).await?);
    }
    Ok(results)
}

async fn write_completion_file(
    system: &dyn System,
    shell: &dyn UnixShell,
    deno: &Path,
) -> Result<CompletionOutcome, ShellSetupError> {
    if !shell.supports_completion().is_supported() {
        return Ok(CompletionOutcome::Unsupported);
    }
    let Some(path) = shell.completions_file_path().await? else {
        return Ok(CompletionOutcome::Unsupported);
    };

    if let Some(parent) = path.parent() {
        match system.ensure_dir(parent).await {
            Ok(()) => {}
            Err(error) if is_permission_denied(&error) => {
                warn!(
                    "Not allowed to create {}, skipping {} completions",
                    parent.display(),
                    shell.name()
                );
                return Ok(CompletionOutcome::Failed);
            }
            Err(error) => return Err(ShellSetupError::create_dir(parent, error)),
        }
    }

    let output = system
        .run_command(deno, &["completions", shell.name()])
        .await
        .map_err(|error| ShellSetupError::run(deno, error))?;
    if !output.success {
        return Err(ShellSetupError::CompletionCommand {
            shell: shell.name().to_string(),
            stderr: output.stderr_lossy(),
        });
    }

    let contents = output.stdout_lossy();
    if contents.is_empty() {
        warn!("Completions were empty, skipping {}", shell.name());
        return Ok(CompletionOutcome::Failed);
    }

    let current = match system.read_to_string(&path).await {
        Ok(current) => Some(current),
        Err(error) if error.kind() == io::ErrorKind::NotFound => None,
        Err(error) if is_permission_denied(&error) => {
            warn!("Not allowed to read {}, skipping {} completions", path.display(), shell.name());
            return Ok(CompletionOutcome::Failed);
        }
        Err(error) => return Err(ShellSetupError::read(&path, error)),
    };

    if current.as_deref() == Some(contents.as_str()) {
        return Ok(CompletionOutcome::UpToDate);
    }
    if current.is_some() {
        warn!(
            "an existing completion file for deno already exists at {}, but is out of date. overwriting with new contents",
            path.display()
        );
    }

    match system.write(&path, &contents).await {
        Ok(()) => {
            info!("wrote {} completions to {}", shell.name(), path.display());
            Ok(CompletionOutcome::Written)
        }
        Err(error) if is_permission_denied(&error) => {
            warn!("Not allowed to write {}, skipping {} completions", path.display(), shell.name());
            Ok(CompletionOutcome::Failed)
        }
        Err(source) => Err(ShellSetupError::CompletionFile { path, source }),
    }
}

/// Add the commands activating completions to each shell's rc files.
/// Returns, per shell, what happened to each rc file.
pub async fn write_completion_rc_commands(
    system: &dyn System,
    shells: &[&dyn UnixShell],
    backups: &mut Backups,
) -> Result<Vec<Vec<RcFileChange>>, ShellSetupError> {
    let mut results = Vec::with_capacity(shells.len());
    for shell in shells {
        let mut changes = Vec::new();
        if shell.supports_completion().is_supported()
            && let Some(update) = shell.completions_source_string().await?
        {
            for rc in shell.rcs_to_update().await? {
                let outcome = update_rc_file(system, &rc, &update, backups).await?;
                changes.push(RcFileChange { path: rc, outcome });
            }
        }
        results.push(changes);
    }
    Ok(results)
}
