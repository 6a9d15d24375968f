use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use denoinst_platform::{HostOs, System};

use super::{CompletionSupport, ShellKind, UnixShell, existing_files};
use crate::error::ShellSetupError;
use crate::rc_file::RcUpdate;

const RC_FILES: [&str; 3] = [".bash_profile", ".bash_login", ".bashrc"];
const ROOT_COMPLETIONS_FILE: &str = "/usr/local/etc/bash_completion.d/deno.bash";

/// Bash counts as installed only if one of its rc files already exists,
/// and only those existing files are edited.
pub struct Bash {
    system: Arc<dyn System>,
}

impl Bash {
    #[must_use]
    pub fn new(system: Arc<dyn System>) -> Self {
        Self { system }
    }

    fn completions_path(&self) -> PathBuf {
        if self.system.env_var("USER").as_deref() == Some("root") {
            return PathBuf::from(ROOT_COMPLETIONS_FILE);
        }
        self.system
            .home_dir()
            .join(".local/share/bash-completion/completions/deno.bash")
    }
}

#[async_trait]
impl UnixShell for Bash {
    fn kind(&self) -> ShellKind {
        ShellKind::Bash
    }

    fn supports_completion(&self) -> CompletionSupport {
        if self.system.os() == HostOs::MacOs {
            CompletionSupport::Discouraged("not recommended on macOS")
        } else {
            CompletionSupport::Supported
        }
    }

    async fn exists(&self) -> Result<bool, ShellSetupError> {
        Ok(!self.rcs_to_update().await?.is_empty())
    }

    async fn rc_files(&self) -> Result<Vec<PathBuf>, ShellSetupError> {
        let home = self.system.home_dir();
        Ok(RC_FILES.iter().map(|rc| home.join(rc)).collect())
    }

    async fn rcs_to_update(&self) -> Result<Vec<PathBuf>, ShellSetupError> {
        existing_files(self.system.as_ref(), self.rc_files().await?).await
    }

    async fn completions_file_path(&self) -> Result<Option<PathBuf>, ShellSetupError> {
        Ok(Some(self.completions_path()))
    }

    async fn completions_source_string(&self) -> Result<Option<RcUpdate>, ShellSetupError> {
        Ok(Some(RcUpdate::append(format!(
            "source {}",
            self.completions_path().display()
        ))))
    }
}
