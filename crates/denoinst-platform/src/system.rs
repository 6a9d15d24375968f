use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Host operating system family, as far as shell setup cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl HostOs {
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            HostOs::MacOs
        } else if cfg!(target_os = "windows") {
            HostOs::Windows
        } else if cfg!(target_os = "linux") {
            HostOs::Linux
        } else {
            HostOs::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathInfo {
    pub is_file: bool,
    pub is_dir: bool,
}

impl PathInfo {
    #[must_use]
    pub fn file() -> Self {
        Self {
            is_file: true,
            is_dir: false,
        }
    }

    #[must_use]
    pub fn dir() -> Self {
        Self {
            is_file: false,
            is_dir: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    #[must_use]
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    #[must_use]
    pub fn failure(stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            success: false,
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Everything the shell setup engine needs from the host: filesystem,
/// environment variables, subprocesses and the user's home directory.
///
/// Implementations surface raw I/O failures; classifying them (soft
/// permission denials vs. fatal errors) is left to the caller.
#[async_trait]
pub trait System: Send + Sync {
    /// Stat a path. Returns `Ok(None)` when the path does not exist or the
    /// stat itself was refused with a permission error.
    async fn stat(&self, path: &Path) -> io::Result<Option<PathInfo>>;

    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate `path` and write `contents` to it.
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Look up an environment variable. Empty values count as unset.
    fn env_var(&self, name: &str) -> Option<String>;

    async fn find_command(&self, name: &str) -> Option<PathBuf>;

    async fn run_command(&self, program: &Path, args: &[&str]) -> io::Result<CommandOutput>;

    fn home_dir(&self) -> &Path;

    fn os(&self) -> HostOs {
        HostOs::current()
    }

    async fn is_existing_file(&self, path: &Path) -> io::Result<bool> {
        Ok(self.stat(path).await?.is_some_and(|info| info.is_file))
    }

    async fn is_existing_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(self.stat(path).await?.is_some_and(|info| info.is_dir))
    }

    async fn path_exists(&self, path: &Path) -> io::Result<bool> {
        Ok(self.stat(path).await?.is_some())
    }

    /// Create `dir` (recursively) unless it is already a directory.
    async fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        if self.is_existing_dir(dir).await? {
            return Ok(());
        }
        self.create_dir_all(dir).await
    }
}

/// Whether a write failure means "not allowed here" rather than "broken".
#[must_use]
pub fn is_permission_denied(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem
    )
}
