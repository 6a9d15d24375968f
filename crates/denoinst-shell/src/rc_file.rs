use serde::Serialize;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

use denoinst_platform::{System, is_permission_denied};
use log::{debug, info, warn};

use crate::backup::Backups;
use crate::error::ShellSetupError;

/// Content to add to an rc file: a block to put at the top, a block to put
/// at the bottom, or both. Blocks already present in the file are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RcUpdate {
    pub prepend: Option<String>,
    pub append: Option<String>,
}

impl RcUpdate {
    #[must_use]
    pub fn append(append: impl Into<String>) -> Self {
        Self {
            prepend: None,
            append: Some(append.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prepend.as_deref().is_none_or(str::is_empty)
            && self.append.as_deref().is_none_or(str::is_empty)
    }
}

impl From<String> for RcUpdate {
    fn from(append: String) -> Self {
        Self::append(append)
    }
}

impl From<&str> for RcUpdate {
    fn from(append: &str) -> Self {
        Self::append(append)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RcFileOutcome {
    Updated,
    AlreadyPresent,
    PermissionDenied,
}

/// A planned rewrite of one rc file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcEdit {
    pub original: Option<String>,
    pub modified: String,
    pub changes: Vec<String>,
}

impl RcEdit {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    #[must_use]
    pub fn diff_preview(&self) -> String {
        if !self.has_changes() {
            return "No changes needed.".to_string();
        }

        let mut preview = String::new();
        for change in &self.changes {
            let _ = writeln!(preview, "+ {change}");
        }
        preview
    }
}

/// Work out the new contents of an rc file currently holding `existing`
/// (`None` if the file does not exist). Returns `None` when every requested
/// block is already present.
#[must_use]
pub fn plan_rc_edit(existing: Option<&str>, update: &RcUpdate) -> Option<RcEdit> {
    let mut prepend = update.prepend.clone().filter(|block| !block.is_empty());
    let mut append = update.append.clone().filter(|block| !block.is_empty());

    if let Some(contents) = existing {
        if prepend.as_deref().is_some_and(|block| contents.contains(block)) {
            prepend = None;
        }
        if append.as_deref().is_some_and(|block| contents.contains(block)) {
            append = None;
        }
    }

    if prepend.is_none() && append.is_none() {
        return None;
    }

    let original = existing.unwrap_or_default();
    let mut changes = Vec::new();
    let mut modified = String::with_capacity(original.len() + 64);

    if let Some(block) = prepend {
        changes.push(format!("Prepend: {}", first_line(&block)));
        modified.push_str(&block);
        if !block.ends_with('\n') {
            modified.push('\n');
        }
    }

    modified.push_str(original);

    if let Some(block) = append {
        changes.push(format!("Append: {}", first_line(&block)));
        if !original.is_empty() && !original.ends_with('\n') && !block.starts_with('\n') {
            modified.push('\n');
        }
        modified.push_str(&block);
    }

    Some(RcEdit {
        original: existing.map(str::to_string),
        modified,
        changes,
    })
}

fn first_line(block: &str) -> &str {
    block.trim_start_matches('\n').lines().next().unwrap_or_default()
}

/// Idempotently add `update` to the rc file at `rc`.
///
/// Pre-existing content is backed up before the first change made to the
/// file during this run. Missing parent directories are created. Being
/// refused permission is reported as [`RcFileOutcome::PermissionDenied`]
/// rather than an error.
pub async fn update_rc_file(
    system: &dyn System,
    rc: &Path,
    update: &RcUpdate,
    backups: &mut Backups,
) -> Result<RcFileOutcome, ShellSetupError> {
    if update.is_empty() {
        return Ok(RcFileOutcome::AlreadyPresent);
    }

    let existing = match system.read_to_string(rc).await {
        Ok(contents) => Some(contents),
        Err(error) if error.kind() == io::ErrorKind::NotFound => None,
        Err(error) if is_permission_denied(&error) => {
            warn!("Not allowed to read {}, skipping it", rc.display());
            return Ok(RcFileOutcome::PermissionDenied);
        }
        Err(error) => return Err(ShellSetupError::read(rc, error)),
    };

    let Some(edit) = plan_rc_edit(existing.as_deref(), update) else {
        debug!("{} is already up to date", rc.display());
        return Ok(RcFileOutcome::AlreadyPresent);
    };

    if let Some(original) = edit.original.as_deref()
        && !original.is_empty()
    {
        backups.add(system, rc, original).await?;
    }

    if let Some(parent) = rc.parent() {
        match system.ensure_dir(parent).await {
            Ok(()) => {}
            Err(error) if is_permission_denied(&error) => {
                warn!("Not allowed to create {}, skipping {}", parent.display(), rc.display());
                return Ok(RcFileOutcome::PermissionDenied);
            }
            Err(error) => return Err(ShellSetupError::create_dir(parent, error)),
        }
    }

    match system.write(rc, &edit.modified).await {
        Ok(()) => {
            info!("updated {}:\n{}", rc.display(), edit.diff_preview().trim_end());
            Ok(RcFileOutcome::Updated)
        }
        Err(error) if is_permission_denied(&error) => {
            warn!("Not allowed to write {}, skipping it", rc.display());
            Ok(RcFileOutcome::PermissionDenied)
        }
        Err(source) => Err(ShellSetupError::RcFile {
            path: rc.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denoinst_platform::MemorySystem;
    use std::path::PathBuf;

    const SOURCE: &str = r#". "/home/u/.deno/env""#;

    fn both(prepend: &str, append: &str) -> RcUpdate {
        RcUpdate {
            prepend: Some(prepend.to_string()),
            append: Some(append.to_string()),
        }
    }

    #[test]
    fn empty_request_plans_nothing() {
        assert!(RcUpdate::default().is_empty());
        assert!(both("", "").is_empty());
        assert!(plan_rc_edit(Some("x"), &both("", "")).is_none());
    }

    #[test]
    fn append_to_missing_file_is_the_block_alone() {
        let edit = plan_rc_edit(None, &RcUpdate::append(SOURCE)).unwrap();
        assert_eq!(edit.modified, SOURCE);
        assert!(edit.original.is_none());
    }

    #[test]
    fn append_starts_on_its_own_line() {
        let edit = plan_rc_edit(Some("export A=1"), &RcUpdate::append(SOURCE)).unwrap();
        assert_eq!(edit.modified, format!("export A=1\n{SOURCE}"));
    }

    #[test]
    fn append_does_not_duplicate_trailing_newline() {
        let edit = plan_rc_edit(Some("export A=1\n"), &RcUpdate::append(SOURCE)).unwrap();
        assert_eq!(edit.modified, format!("export A=1\n{SOURCE}"));
    }

    #[test]
    fn append_to_empty_file_needs_no_leading_newline() {
        let edit = plan_rc_edit(Some(""), &RcUpdate::append(SOURCE)).unwrap();
        assert_eq!(edit.modified, SOURCE);
    }

    #[test]
    fn present_blocks_are_cancelled() {
        let contents = format!("# rc\n{SOURCE}\n");
        assert!(plan_rc_edit(Some(&contents), &RcUpdate::append(SOURCE)).is_none());
    }

    #[test]
    fn prepend_gets_trailing_newline_and_goes_first() {
        let edit = plan_rc_edit(Some("export A=1\n"), &both("fpath", "compinit")).unwrap();
        assert_eq!(edit.modified, "fpath\nexport A=1\ncompinit");
        assert_eq!(edit.changes.len(), 2);
    }

    #[test]
    fn prepend_is_kept_when_only_append_is_present() {
        let edit = plan_rc_edit(Some("compinit\n"), &both("fpath", "compinit")).unwrap();
        assert_eq!(edit.modified, "fpath\ncompinit\n");
        assert_eq!(edit.changes, ["Prepend: fpath"]);
    }

    #[test]
    fn prepend_to_missing_file_still_ends_with_newline() {
        let update = RcUpdate {
            prepend: Some("fpath".to_string()),
            append: None,
        };
        assert_eq!(plan_rc_edit(None, &update).unwrap().modified, "fpath\n");
    }

    #[test]
    fn original_content_is_preserved_contiguously() {
        let original = "line one\nline two";
        let edit = plan_rc_edit(Some(original), &both("top", "bottom")).unwrap();
        assert!(edit.modified.contains(original));
    }

    #[test]
    fn diff_preview_lists_changes() {
        let edit = plan_rc_edit(None, &RcUpdate::append("\n# deno\nsource x")).unwrap();
        assert_eq!(edit.diff_preview(), "+ Append: # deno\n");
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let system = MemorySystem::new("/home/u").with_file("/home/u/.bashrc", "export A=1");
        let rc = PathBuf::from("/home/u/.bashrc");
        let mut backups = Backups::new("/home/u/.deno/.shellRcBackups");
        system
            .create_dir_all(Path::new("/home/u/.deno/.shellRcBackups"))
            .await
            .unwrap();

        let first = update_rc_file(&system, &rc, &SOURCE.into(), &mut backups)
            .await
            .unwrap();
        let after_first = system.file(&rc).unwrap();
        let second = update_rc_file(&system, &rc, &SOURCE.into(), &mut backups)
            .await
            .unwrap();

        assert_eq!(first, RcFileOutcome::Updated);
        assert_eq!(second, RcFileOutcome::AlreadyPresent);
        assert_eq!(system.file(&rc).unwrap(), after_first);
    }

    #[tokio::test]
    async fn empty_request_touches_nothing() {
        let system = MemorySystem::new("/home/u").with_failing("/home/u/.bashrc");
        let mut backups = Backups::new("/backups");

        let outcome = update_rc_file(
            &system,
            Path::new("/home/u/.bashrc"),
            &RcUpdate::default(),
            &mut backups,
        )
        .await
        .expect("no I/O should happen");

        assert_eq!(outcome, RcFileOutcome::AlreadyPresent);
        assert!(backups.is_empty());
    }

    #[tokio::test]
    async fn missing_file_and_parents_are_created_without_backup() {
        let system = MemorySystem::new("/home/u");
        let rc = PathBuf::from("/home/u/.config/fish/conf.d/deno.fish");
        let mut backups = Backups::new("/home/u/.deno/.shellRcBackups");

        let outcome = update_rc_file(&system, &rc, &"source x".into(), &mut backups)
            .await
            .unwrap();

        assert_eq!(outcome, RcFileOutcome::Updated);
        assert_eq!(system.file(&rc).as_deref(), Some("source x"));
        assert!(backups.is_empty());
    }

    #[tokio::test]
    async fn permission_denied_is_soft() {
        let system = MemorySystem::new("/home/u")
            .with_file("/home/u/.profile", "")
            .with_protected("/home/u/.profile");
        let mut backups = Backups::new("/backups");

        let outcome = update_rc_file(
            &system,
            Path::new("/home/u/.profile"),
            &SOURCE.into(),
            &mut backups,
        )
        .await
        .unwrap();

        assert_eq!(outcome, RcFileOutcome::PermissionDenied);
        assert_eq!(system.file("/home/u/.profile").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn other_write_failures_name_the_file() {
        let system = MemorySystem::new("/home/u").with_failing("/home/u/.zshrc");
        let mut backups = Backups::new("/backups");

        let error = update_rc_file(
            &system,
            Path::new("/home/u/.zshrc"),
            &SOURCE.into(),
            &mut backups,
        )
        .await
        .expect_err("simulated failure");

        assert!(error.to_string().contains("/home/u/.zshrc"));
    }
}
