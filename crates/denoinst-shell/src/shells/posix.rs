use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use denoinst_platform::System;

use super::{CompletionSupport, ShellKind, UnixShell};
use crate::error::ShellSetupError;

/// Plain `sh`. Always present, configured through `~/.profile`.
pub struct Posix {
    system: Arc<dyn System>,
}

impl Posix {
    #[must_use]
    pub fn new(system: Arc<dyn System>) -> Self {
        Self { system }
    }
}

#[async_trait]
impl UnixShell for Posix {
    fn kind(&self) -> ShellKind {
        ShellKind::Posix
    }

    fn supports_completion(&self) -> CompletionSupport {
        CompletionSupport::Unsupported
    }

    async fn exists(&self) -> Result<bool, ShellSetupError> {
        Ok(true)
    }

    async fn rc_files(&self) -> Result<Vec<PathBuf>, ShellSetupError> {
        Ok(vec![self.system.home_dir().join(".profile")])
    }

    async fn rcs_to_update(&self) -> Result<Vec<PathBuf>, ShellSetupError> {
        self.rc_files().await
    }
}
