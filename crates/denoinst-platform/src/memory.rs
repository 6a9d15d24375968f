use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::system::{CommandOutput, HostOs, PathInfo, System};

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    env: HashMap<String, String>,
    executables: BTreeMap<String, PathBuf>,
    commands: HashMap<String, CommandOutput>,
    protected: BTreeSet<PathBuf>,
    failing: BTreeSet<PathBuf>,
    writes: Vec<PathBuf>,
}

impl MemoryState {
    fn add_dir_with_ancestors(&mut self, dir: &Path) {
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn is_protected(&self, path: &Path) -> bool {
        path.ancestors().any(|ancestor| self.protected.contains(ancestor))
    }
}

/// In-memory host used to drive the setup engine deterministically.
///
/// Directories must exist before files can be written into them, mirroring
/// the real filesystem. Paths marked protected (and everything below them)
/// refuse writes with `PermissionDenied`.
#[derive(Debug)]
pub struct MemorySystem {
    home: PathBuf,
    os: HostOs,
    state: Mutex<MemoryState>,
}

impl MemorySystem {
    #[must_use]
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let mut state = MemoryState::default();
        state.add_dir_with_ancestors(&home);
        Self {
            home,
            os: HostOs::Linux,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn with_os(mut self, os: HostOs) -> Self {
        self.os = os;
        self
    }

    #[must_use]
    pub fn with_env(self, name: &str, value: &str) -> Self {
        self.state().env.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.put_file(path, contents);
        self
    }

    #[must_use]
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.state().add_dir_with_ancestors(path.as_ref());
        self
    }

    /// Make `name` discoverable on PATH.
    #[must_use]
    pub fn with_executable(self, name: &str) -> Self {
        let path = PathBuf::from("/usr/bin").join(name);
        self.state().executables.insert(name.to_string(), path);
        self
    }

    /// Script the output of `program args...`.
    #[must_use]
    pub fn with_command(self, program: impl AsRef<Path>, args: &[&str], output: CommandOutput) -> Self {
        let key = command_key(program.as_ref(), args);
        self.state().commands.insert(key, output);
        self
    }

    /// Refuse writes to `path` and anything below it.
    #[must_use]
    pub fn with_protected(self, path: impl AsRef<Path>) -> Self {
        self.state().protected.insert(path.as_ref().to_path_buf());
        self
    }

    /// Fail every operation touching `path` with a non-permission error.
    #[must_use]
    pub fn with_failing(self, path: impl AsRef<Path>) -> Self {
        self.state().failing.insert(path.as_ref().to_path_buf());
        self
    }

    pub fn put_file(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        let mut state = self.state();
        if let Some(parent) = path.parent() {
            state.add_dir_with_ancestors(parent);
        }
        state.files.insert(path.to_path_buf(), contents.to_string());
    }

    #[must_use]
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state().files.get(path.as_ref()).cloned()
    }

    #[must_use]
    pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
        self.state().dirs.contains(path.as_ref())
    }

    /// Every path successfully written through [`System::write`], in order.
    #[must_use]
    pub fn writes(&self) -> Vec<PathBuf> {
        self.state().writes.clone()
    }

    #[must_use]
    pub fn files_under(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        self.state()
            .files
            .keys()
            .filter(|path| path.starts_with(dir))
            .cloned()
            .collect()
    }

    fn check_failing(state: &MemoryState, path: &Path) -> io::Result<()> {
        if state.failing.contains(path) {
            return Err(io::Error::other(format!(
                "simulated failure for {}",
                path.display()
            )));
        }
        Ok(())
    }
}

fn command_key(program: &Path, args: &[&str]) -> String {
    let mut key = program.display().to_string();
    for arg in args {
        key.push(' ');
        key.push_str(arg);
    }
    key
}

#[async_trait]
impl System for MemorySystem {
    async fn stat(&self, path: &Path) -> io::Result<Option<PathInfo>> {
        let state = self.state();
        Self::check_failing(&state, path)?;
        if state.files.contains_key(path) {
            Ok(Some(PathInfo::file()))
        } else if state.dirs.contains(path) {
            Ok(Some(PathInfo::dir()))
        } else {
            Ok(None)
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self.state();
        Self::check_failing(&state, path)?;
        state.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut state = self.state();
        Self::check_failing(&state, path)?;
        if state.is_protected(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        let parent_exists = path
            .parent()
            .is_none_or(|parent| parent.as_os_str().is_empty() || state.dirs.contains(parent));
        if !parent_exists {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent of {} does not exist", path.display()),
            ));
        }
        state.files.insert(path.to_path_buf(), contents.to_string());
        state.writes.push(path.to_path_buf());
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state();
        Self::check_failing(&state, path)?;
        if state.is_protected(path) && !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot create {}", path.display()),
            ));
        }
        state.add_dir_with_ancestors(path);
        Ok(())
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.state()
            .env
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    async fn find_command(&self, name: &str) -> Option<PathBuf> {
        self.state().executables.get(name).cloned()
    }

    async fn run_command(&self, program: &Path, args: &[&str]) -> io::Result<CommandOutput> {
        let key = command_key(program, args);
        self.state().commands.get(&key).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such command: {key}"))
        })
    }

    fn home_dir(&self) -> &Path {
        &self.home
    }

    fn os(&self) -> HostOs {
        self.os
    }
}
