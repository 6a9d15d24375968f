use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use log::debug;
use thiserror::Error;

use crate::commands::capture_output;
use crate::fallback::FallbackChain;
use crate::system::{CommandOutput, PathInfo, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HomeDirError {
    #[error("Could not determine home directory")]
    Unavailable,
}

/// The real machine. Environment lookups can be overridden per variable,
/// which keeps host detection deterministic in tests.
#[derive(Debug, Clone)]
pub struct HostSystem {
    home: PathBuf,
    env_overrides: HashMap<String, Option<String>>,
}

impl HostSystem {
    /// Build a host adapter for the current user.
    ///
    /// # Errors
    /// Returns an error if neither the platform home directory lookup nor
    /// `$HOME` yields a directory.
    pub fn new() -> Result<Self, HomeDirError> {
        let home = FallbackChain::new("home directory")
            .attempt_option("platform lookup", dirs::home_dir)
            .attempt_option("$HOME", || {
                std::env::var_os("HOME")
                    .filter(|home| !home.is_empty())
                    .map(PathBuf::from)
            })
            .resolve()
            .ok_or(HomeDirError::Unavailable)?;

        Ok(Self::with_home(home))
    }

    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            env_overrides: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_env(mut self, name: &str, value: impl Into<String>) -> Self {
        self.env_overrides
            .insert(name.to_string(), Some(value.into()));
        self
    }

    #[must_use]
    pub fn without_env(mut self, name: &str) -> Self {
        self.env_overrides.insert(name.to_string(), None);
        self
    }

    fn search_path(&self) -> Option<OsString> {
        match self.env_overrides.get("PATH") {
            Some(value) => value.as_ref().map(OsString::from),
            None => std::env::var_os("PATH"),
        }
    }
}

#[async_trait]
impl System for HostSystem {
    async fn stat(&self, path: &Path) -> io::Result<Option<PathInfo>> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(Some(PathInfo {
                is_file: metadata.is_file(),
                is_dir: metadata.is_dir(),
            })),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::NotFound
                        | io::ErrorKind::NotADirectory
                        | io::ErrorKind::PermissionDenied
                ) =>
            {
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    fn env_var(&self, name: &str) -> Option<String> {
        let value = match self.env_overrides.get(name) {
            Some(value) => value.clone(),
            None => std::env::var(name).ok(),
        };
        value.filter(|value| !value.is_empty())
    }

    async fn find_command(&self, name: &str) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| self.home.clone());
        match which::which_in(name, self.search_path(), &cwd) {
            Ok(path) => Some(path),
            Err(error) => {
                debug!("{name} not found on PATH: {error}");
                None
            }
        }
    }

    async fn run_command(&self, program: &Path, args: &[&str]) -> io::Result<CommandOutput> {
        capture_output(program, args).await
    }

    fn home_dir(&self) -> &Path {
        &self.home
    }
}
