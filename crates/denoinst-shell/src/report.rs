use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::completions::CompletionOutcome;
use crate::rc_file::RcFileOutcome;
use crate::shells::ShellKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RcFileChange {
    pub path: PathBuf,
    pub outcome: RcFileOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathUpdate {
    NotRequested,
    Applied { files: Vec<RcFileChange> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionReport {
    NotRequested,
    Attempted {
        outcome: CompletionOutcome,
        files: Vec<RcFileChange>,
    },
}

/// What setup did for one shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellReport {
    pub shell: ShellKind,
    pub env_written: bool,
    pub path_update: PathUpdate,
    pub completion: CompletionReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    pub install_dir: PathBuf,
    pub shells: Vec<ShellReport>,
    pub backups: Vec<PathBuf>,
}

impl SetupReport {
    #[must_use]
    pub fn shell(&self, kind: ShellKind) -> Option<&ShellReport> {
        self.shells.iter().find(|report| report.shell == kind)
    }

    /// Whether any rc file now sources an env script.
    #[must_use]
    pub fn path_configured(&self) -> bool {
        self.shells.iter().any(|report| match &report.path_update {
            PathUpdate::Applied { files } => files
                .iter()
                .any(|file| file.outcome != RcFileOutcome::PermissionDenied),
            PathUpdate::NotRequested => false,
        })
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        for report in &self.shells {
            let _ = writeln!(summary, "{}:", report.shell);
            if !report.env_written {
                let _ = writeln!(summary, "  env script: not written (permission denied)");
                continue;
            }
            let _ = writeln!(summary, "  env script: written");

            match &report.path_update {
                PathUpdate::NotRequested => {
                    let _ = writeln!(summary, "  PATH: not modified");
                }
                PathUpdate::Applied { files } => write_files(&mut summary, "PATH", files),
            }

            match &report.completion {
                CompletionReport::NotRequested => {}
                CompletionReport::Attempted { outcome, files } => {
                    let _ = writeln!(summary, "  completions: {}", describe_completion(*outcome));
                    write_files(&mut summary, "completions", files);
                }
            }
        }

        for backup in &self.backups {
            let _ = writeln!(summary, "backup: {}", backup.display());
        }
        summary
    }
}

fn write_files(summary: &mut String, label: &str, files: &[RcFileChange]) {
    for file in files {
        let _ = writeln!(
            summary,
            "  {label}: {} {}",
            file.path.display(),
            describe_rc(file.outcome)
        );
    }
}

fn describe_rc(outcome: RcFileOutcome) -> &'static str {
    match outcome {
        RcFileOutcome::Updated => "(updated)",
        RcFileOutcome::AlreadyPresent => "(already configured)",
        RcFileOutcome::PermissionDenied => "(permission denied)",
    }
}

fn describe_completion(outcome: CompletionOutcome) -> &'static str {
    match outcome {
        CompletionOutcome::Written => "installed",
        CompletionOutcome::UpToDate => "up to date",
        CompletionOutcome::Failed => "failed",
        CompletionOutcome::Unsupported => "not supported",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SetupReport {
        SetupReport {
            install_dir: PathBuf::from("/home/u/.deno"),
            shells: vec![
                ShellReport {
                    shell: ShellKind::Posix,
                    env_written: true,
                    path_update: PathUpdate::Applied {
                        files: vec![RcFileChange {
                            path: PathBuf::from("/home/u/.profile"),
                            outcome: RcFileOutcome::Updated,
                        }],
                    },
                    completion: CompletionReport::NotRequested,
                },
                ShellReport {
                    shell: ShellKind::Fish,
                    env_written: false,
                    path_update: PathUpdate::NotRequested,
                    completion: CompletionReport::NotRequested,
                },
            ],
            backups: vec![PathBuf::from("/home/u/.deno/.shellRcBackups/.profile.bak")],
        }
    }

    #[test]
    fn summary_describes_each_shell() {
        let summary = report().summary();

        assert!(summary.contains("sh:\n  env script: written\n"));
        assert!(summary.contains("  PATH: /home/u/.profile (updated)\n"));
        assert!(summary.contains("fish:\n  env script: not written (permission denied)\n"));
        assert!(summary.contains("backup: /home/u/.deno/.shellRcBackups/.profile.bak"));
    }

    #[test]
    fn path_configured_ignores_denied_files() {
        let mut report = report();
        assert!(report.path_configured());

        report.shells[0].path_update = PathUpdate::Applied {
            files: vec![RcFileChange {
                path: PathBuf::from("/home/u/.profile"),
                outcome: RcFileOutcome::PermissionDenied,
            }],
        };
        assert!(!report.path_configured());
    }

    #[test]
    fn report_serializes_with_tagged_outcomes() {
        let json = serde_json::to_value(report()).expect("serialize report");

        assert_eq!(json["shells"][0]["shell"], "sh");
        assert_eq!(json["shells"][0]["path_update"]["status"], "applied");
        assert_eq!(
            json["shells"][0]["path_update"]["files"][0]["outcome"],
            "updated"
        );
        assert_eq!(json["shells"][1]["completion"]["status"], "not_requested");
    }
}
