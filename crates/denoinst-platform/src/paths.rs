use std::path::{Path, PathBuf};

pub const BACKUP_DIR_NAME: &str = ".shellRcBackups";

/// Paths inside a deno install directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    #[must_use]
    pub fn deno_binary(&self) -> PathBuf {
        let name = if cfg!(windows) { "deno.exe" } else { "deno" };
        self.bin_dir().join(name)
    }

    /// Location of an env script such as `env` or `env.fish`.
    #[must_use]
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(BACKUP_DIR_NAME)
    }
}
