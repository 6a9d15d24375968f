use std::path::{Path, PathBuf};
use std::sync::Arc;

use denoinst_platform::{InstallLayout, System};
use log::{debug, info};

use crate::backup::Backups;
use crate::completions::{CompletionOutcome, write_completion_files, write_completion_rc_commands};
use crate::env_files::write_env_files;
use crate::error::ShellSetupError;
use crate::rc_file::{RcUpdate, update_rc_file};
use crate::report::{CompletionReport, PathUpdate, RcFileChange, SetupReport, ShellReport};
use crate::shells::{UnixShell, all_shells};

/// Answers the questions setup would ask the user.
pub trait Prompter {
    fn confirm(&mut self, message: &str, default: bool) -> bool;

    /// Indices of the chosen `options`.
    fn multi_select(&mut self, message: &str, options: &[String]) -> Vec<usize>;
}

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub install_dir: PathBuf,
    /// Accept defaults instead of prompting. No completions are set up.
    pub skip_prompts: bool,
    /// Never edit rc files to put deno on PATH.
    pub no_modify_path: bool,
    /// Binary run as `<deno> completions <shell>`. Defaults to the
    /// installed `bin/deno`.
    pub deno_binary: Option<PathBuf>,
}

impl SetupOptions {
    #[must_use]
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            skip_prompts: false,
            no_modify_path: false,
            deno_binary: None,
        }
    }

    #[must_use]
    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(&self.install_dir)
    }

    #[must_use]
    pub fn deno_binary(&self) -> PathBuf {
        self.deno_binary
            .clone()
            .unwrap_or_else(|| self.layout().deno_binary())
    }
}

/// Shells present on this machine. A shell whose detection fails is treated
/// as absent.
pub async fn get_available_shells(system: &Arc<dyn System>) -> Vec<Box<dyn UnixShell>> {
    let mut present = Vec::new();
    for shell in all_shells(system) {
        match shell.exists().await {
            Ok(true) => present.push(shell),
            Ok(false) => debug!("{} not found", shell.name()),
            Err(error) => debug!("could not detect {}: {error}", shell.name()),
        }
    }
    present
}

/// Configure every available shell: write env scripts, source them from
/// rc files, and optionally install completions.
///
/// Rc files are only touched after every env script is in place.
pub async fn setup_shells(
    system: Arc<dyn System>,
    options: &SetupOptions,
    prompter: &mut dyn Prompter,
) -> Result<SetupReport, ShellSetupError> {
    let layout = options.layout();
    let install_dir = layout.root();

    let available = get_available_shells(&system).await;
    info!(
        "configuring shells: {}",
        available
            .iter()
            .map(|shell| shell.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let env_files = write_env_files(system.as_ref(), available, install_dir).await?;
    let shells = env_files.configured;

    let mut reports: Vec<ShellReport> = shells
        .iter()
        .map(|shell| new_report(shell.as_ref(), true))
        .chain(
            env_files
                .dropped
                .iter()
                .map(|shell| new_report(shell.as_ref(), false)),
        )
        .collect();

    let mut backups = Backups::new(layout.backup_dir());

    let modify_path = !options.no_modify_path
        && (options.skip_prompts
            || prompter.confirm("Edit shell configs to add deno to the PATH?", true));
    if modify_path {
        ensure_backup_dir(system.as_ref(), backups.backup_dir()).await?;
        for shell in &shells {
            let files =
                add_to_path(system.as_ref(), shell.as_ref(), install_dir, &mut backups).await?;
            if let Some(report) = report_for(&mut reports, shell.as_ref()) {
                report.path_update = PathUpdate::Applied { files };
            }
        }
    }

    let with_completion: Vec<&dyn UnixShell> = shells
        .iter()
        .map(|shell| shell.as_ref())
        .filter(|shell| shell.supports_completion().is_supported())
        .collect();
    let selected = select_completions(&with_completion, options.skip_prompts, prompter);

    if !selected.is_empty() {
        ensure_backup_dir(system.as_ref(), backups.backup_dir()).await?;
        let outcomes =
            write_completion_files(system.as_ref(), &selected, &options.deno_binary()).await?;

        let succeeded: Vec<&dyn UnixShell> = selected
            .iter()
            .zip(&outcomes)
            .filter(|(_, outcome)| !outcome.is_failure())
            .map(|(shell, _)| *shell)
            .collect();
        let rc_changes =
            write_completion_rc_commands(system.as_ref(), &succeeded, &mut backups).await?;

        record_completions(&mut reports, &selected, &outcomes, &succeeded, rc_changes);
    }

    reports.sort_by_key(|report| report.shell);

    Ok(SetupReport {
        install_dir: install_dir.to_path_buf(),
        shells: reports,
        backups: backups.written().to_vec(),
    })
}

fn new_report(shell: &dyn UnixShell, env_written: bool) -> ShellReport {
    ShellReport {
        shell: shell.kind(),
        env_written,
        path_update: PathUpdate::NotRequested,
        completion: CompletionReport::NotRequested,
    }
}

fn report_for<'a>(
    reports: &'a mut [ShellReport],
    shell: &dyn UnixShell,
) -> Option<&'a mut ShellReport> {
    let kind = shell.kind();
    reports.iter_mut().find(|report| report.shell == kind)
}

async fn ensure_backup_dir(system: &dyn System, backup_dir: &Path) -> Result<(), ShellSetupError> {
    system
        .ensure_dir(backup_dir)
        .await
        .map_err(|error| ShellSetupError::create_dir(backup_dir, error))
}

/// Source the shell's env script from each of its rc files.
async fn add_to_path(
    system: &dyn System,
    shell: &dyn UnixShell,
    install_dir: &Path,
    backups: &mut Backups,
) -> Result<Vec<RcFileChange>, ShellSetupError> {
    let source = shell.source_string(install_dir);
    let update = RcUpdate::from(source);
    let mut changes = Vec::new();
    for rc in shell.rcs_to_update().await? {
        let outcome = update_rc_file(system, &rc, &update, backups).await?;
        changes.push(RcFileChange { path: rc, outcome });
    }
    Ok(changes)
}

fn select_completions<'a>(
    candidates: &[&'a dyn UnixShell],
    skip_prompts: bool,
    prompter: &mut dyn Prompter,
) -> Vec<&'a dyn UnixShell> {
    if skip_prompts || candidates.is_empty() {
        return Vec::new();
    }

    let labels: Vec<String> = candidates
        .iter()
        .map(|shell| match shell.supports_completion().note() {
            Some(note) => format!("{} ({note})", shell.name()),
            None => shell.name().to_string(),
        })
        .collect();

    let mut chosen = prompter.multi_select("Set up completions?", &labels);
    chosen.sort_unstable();
    chosen.dedup();
    chosen
        .into_iter()
        .filter_map(|index| candidates.get(index).copied())
        .collect()
}

fn record_completions(
    reports: &mut [ShellReport],
    selected: &[&dyn UnixShell],
    outcomes: &[CompletionOutcome],
    succeeded: &[&dyn UnixShell],
    rc_changes: Vec<Vec<RcFileChange>>,
) {
    for (shell, outcome) in selected.iter().zip(outcomes) {
        if let Some(report) = report_for(reports, *shell) {
            report.completion = CompletionReport::Attempted {
                outcome: *outcome,
                files: Vec::new(),
            };
        }
    }
    for (shell, changes) in succeeded.iter().zip(rc_changes) {
        if let Some(ShellReport {
            completion: CompletionReport::Attempted { files, .. },
            ..
        }) = report_for(reports, *shell)
        {
            *files = changes;
        }
    }
}

/// What to tell the user when automatic setup failed.
#[must_use]
pub fn manual_setup_instructions(install_dir: &Path) -> String {
    let install_dir = install_dir.display();
    format!(
        "Failed to configure your shell environments, you may need to manually add deno to your PATH environment variable.

Manually add the directory to your $HOME/.bashrc (or similar):
  export DENO_INSTALL=\"{install_dir}\"
  export PATH=\"{install_dir}/bin:$PATH\"
"
    )
}
