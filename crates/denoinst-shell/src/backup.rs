use std::collections::HashMap;
use std::path::{Path, PathBuf};

use denoinst_platform::System;
use log::info;

use crate::error::ShellSetupError;

/// Backups of rc files taken during one setup run.
///
/// Only the first snapshot of a file is kept: later calls for a path that
/// was already backed up do nothing. Files sharing a name get distinct
/// backups (`.zshrc.bak`, `.zshrc.1.bak`, ...). The backup directory must
/// exist before the first call.
#[derive(Debug)]
pub struct Backups {
    backup_dir: PathBuf,
    backed_up: HashMap<PathBuf, PathBuf>,
    written: Vec<PathBuf>,
}

impl Backups {
    #[must_use]
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            backed_up: HashMap::new(),
            written: Vec::new(),
        }
    }

    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.backed_up.contains_key(path)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backed_up.is_empty()
    }

    /// Backup files written so far, in order.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Where `path` is (or would be) backed up: `<name>.bak`, or
    /// `<name>.<n>.bak` when another file of this run already took that name.
    #[must_use]
    pub fn destination(&self, path: &Path) -> PathBuf {
        if let Some(dest) = self.backed_up.get(path) {
            return dest.clone();
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut dest = self.backup_dir.join(format!("{name}.bak"));
        let mut n = 1;
        while self.written.contains(&dest) {
            dest = self.backup_dir.join(format!("{name}.{n}.bak"));
            n += 1;
        }
        dest
    }

    pub async fn add(
        &mut self,
        system: &dyn System,
        path: &Path,
        contents: &str,
    ) -> Result<(), ShellSetupError> {
        if self.backed_up.contains_key(path) {
            return Ok(());
        }

        let dest = self.destination(path);
        info!("backing '{}' up to '{}'", path.display(), dest.display());
        system
            .write(&dest, contents)
            .await
            .map_err(|source| ShellSetupError::Backup {
                path: path.to_path_buf(),
                dest: dest.clone(),
                source,
            })?;

        self.backed_up.insert(path.to_path_buf(), dest.clone());
        self.written.push(dest);
        Ok(())
    }
}
