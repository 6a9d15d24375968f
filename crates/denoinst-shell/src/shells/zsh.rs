use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

use denoinst_platform::System;
use log::debug;

use super::{CompletionSupport, ShellKind, UnixShell, existing_files, shell_env_contains};
use crate::error::ShellSetupError;
use crate::rc_file::RcUpdate;

/// Files whose presence suggests `compinit` is already being called.
const COMPINIT_HINTS: [&str; 3] = [".zcompdump", ".oh_my_zsh", ".zprezto"];

const COMPINIT: &str =
    "# Initialize zsh completions (added by deno install script)\nautoload -Uz compinit\ncompinit";

pub struct Zsh {
    system: Arc<dyn System>,
    dot_dir: OnceCell<Option<PathBuf>>,
}

impl Zsh {
    #[must_use]
    pub fn new(system: Arc<dyn System>) -> Self {
        Self {
            system,
            dot_dir: OnceCell::new(),
        }
    }

    /// The user's `ZDOTDIR`, if set. Read from the environment when we are
    /// running under zsh, otherwise asked from zsh itself.
    pub async fn dot_dir(&self) -> Result<Option<&Path>, ShellSetupError> {
        let dot_dir = self
            .dot_dir
            .get_or_try_init(|| self.resolve_dot_dir())
            .await?;
        Ok(dot_dir.as_deref())
    }

    async fn resolve_dot_dir(&self) -> Result<Option<PathBuf>, ShellSetupError> {
        if shell_env_contains(self.system.as_ref(), "zsh") {
            return Ok(self.system.env_var("ZDOTDIR").map(PathBuf::from));
        }

        let zsh = Path::new("zsh");
        let output = self
            .system
            .run_command(zsh, &["-c", "echo -n $ZDOTDIR"])
            .await
            .map_err(|error| ShellSetupError::run(zsh, error))?;
        let stdout = output.stdout_lossy();
        let dot_dir = stdout.trim();
        debug!("zsh reported ZDOTDIR={dot_dir:?}");

        Ok((!dot_dir.is_empty()).then(|| PathBuf::from(dot_dir)))
    }

    async fn completions_dir_root(&self) -> Result<PathBuf, ShellSetupError> {
        Ok(match self.dot_dir().await? {
            Some(dot_dir) => dot_dir.to_path_buf(),
            None => self.system.home_dir().join(".zsh"),
        })
    }

    async fn compinit_likely_configured(&self) -> Result<bool, ShellSetupError> {
        let dot_dir = match self.dot_dir().await? {
            Some(dot_dir) => dot_dir.to_path_buf(),
            None => self.system.home_dir().to_path_buf(),
        };
        let system = self.system.as_ref();
        let probes = COMPINIT_HINTS.iter().map(|hint| {
            let path = dot_dir.join(hint);
            async move {
                system
                    .path_exists(&path)
                    .await
                    .map_err(|error| ShellSetupError::probe(&path, error))
            }
        });

        Ok(try_join_all(probes).await?.into_iter().any(|found| found))
    }
}

#[async_trait]
impl UnixShell for Zsh {
    fn kind(&self) -> ShellKind {
        ShellKind::Zsh
    }

    fn supports_completion(&self) -> CompletionSupport {
        CompletionSupport::Supported
    }

    async fn exists(&self) -> Result<bool, ShellSetupError> {
        Ok(shell_env_contains(self.system.as_ref(), "zsh")
            || self.system.find_command("zsh").await.is_some())
    }

    async fn rc_files(&self) -> Result<Vec<PathBuf>, ShellSetupError> {
        let home = self.system.home_dir();
        let mut rc_files = Vec::with_capacity(2);
        if let Some(dot_dir) = self.dot_dir().await? {
            rc_files.push(dot_dir.join(".zshrc"));
        }
        let home_rc = home.join(".zshrc");
        if !rc_files.contains(&home_rc) {
            rc_files.push(home_rc);
        }
        Ok(rc_files)
    }

    /// Existing `.zshrc` files, or every candidate when none exist yet so a
    /// fresh zsh install still gets configured.
    async fn rcs_to_update(&self) -> Result<Vec<PathBuf>, ShellSetupError> {
        let candidates = self.rc_files().await?;
        let existing = existing_files(self.system.as_ref(), candidates.clone()).await?;
        if existing.is_empty() {
            Ok(candidates)
        } else {
            Ok(existing)
        }
    }

    async fn completions_file_path(&self) -> Result<Option<PathBuf>, ShellSetupError> {
        Ok(Some(
            self.completions_dir_root()
                .await?
                .join("completions")
                .join("_deno.zsh"),
        ))
    }

    async fn completions_source_string(&self) -> Result<Option<RcUpdate>, ShellSetupError> {
        let completions_dir = self.completions_dir_root().await?.join("completions");
        let completions_dir = completions_dir.display();
        let fpath_setup = format!(
            "# Add deno completions to search path\nif [[ \":$FPATH:\" != *\":{completions_dir}:\"* ]]; then export FPATH=\"{completions_dir}:$FPATH\"; fi"
        );
        let compinit = if self.compinit_likely_configured().await? {
            None
        } else {
            Some(COMPINIT.to_string())
        };

        Ok(Some(RcUpdate {
            prepend: Some(fpath_setup),
            append: compinit,
        }))
    }
}
