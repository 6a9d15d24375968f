use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use denoinst_platform::System;

use super::{CompletionSupport, ShellKind, UnixShell, shell_env_contains};
use crate::error::ShellSetupError;
use crate::script::ShellScript;

/// Fish has its own syntax, so it brings its own env script and source
/// command. Completions need no rc changes: fish autoloads them.
pub struct Fish {
    system: Arc<dyn System>,
}

impl Fish {
    #[must_use]
    pub fn new(system: Arc<dyn System>) -> Self {
        Self { system }
    }

    /// `$XDG_CONFIG_HOME/fish`, or `~/.config/fish`.
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        match self.system.env_var("XDG_CONFIG_HOME") {
            Some(config_home) => PathBuf::from(config_home).join("fish"),
            None => self.system.home_dir().join(".config").join("fish"),
        }
    }
}

#[async_trait]
impl UnixShell for Fish {
    fn kind(&self) -> ShellKind {
        ShellKind::Fish
    }

    fn supports_completion(&self) -> CompletionSupport {
        CompletionSupport::Supported
    }

    async fn exists(&self) -> Result<bool, ShellSetupError> {
        Ok(shell_env_contains(self.system.as_ref(), "fish")
            || self.system.find_command("fish").await.is_some())
    }

    async fn rc_files(&self) -> Result<Vec<PathBuf>, ShellSetupError> {
        Ok(vec![self.config_dir().join("conf.d").join("deno.fish")])
    }

    async fn rcs_to_update(&self) -> Result<Vec<PathBuf>, ShellSetupError> {
        self.rc_files().await
    }

    fn env_script(&self, install_dir: &Path) -> ShellScript {
        let install_dir = install_dir.display();
        ShellScript::new(
            "env.fish",
            format!(
                r#"
# deno shell setup
if not contains "{install_dir}/bin" $PATH
  # prepend to path to take precedence over potential package manager deno installations
  set -x PATH "{install_dir}/bin" $PATH
end
"#
            ),
        )
    }

    fn source_string(&self, install_dir: &Path) -> String {
        format!(r#"source "{}/env.fish""#, install_dir.display())
    }

    async fn completions_file_path(&self) -> Result<Option<PathBuf>, ShellSetupError> {
        Ok(Some(self.config_dir().join("completions").join("deno.fish")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denoinst_platform::MemorySystem;

    fn fish(memory: MemorySystem) -> Fish {
        Fish::new(Arc::new(memory))
    }

    #[tokio::test]
    async fn rc_file_lives_in_conf_d() {
        let shell = fish(MemorySystem::new("/home/u"));
        assert_eq!(
            shell.rcs_to_update().await.unwrap(),
            [PathBuf::from("/home/u/.config/fish/conf.d/deno.fish")]
        );
    }

    #[tokio::test]
    async fn xdg_config_home_is_honored() {
        let shell = fish(MemorySystem::new("/home/u").with_env("XDG_CONFIG_HOME", "/xdg"));
        assert_eq!(
            shell.rc_files().await.unwrap(),
            [PathBuf::from("/xdg/fish/conf.d/deno.fish")]
        );
        assert_eq!(
            shell.completions_file_path().await.unwrap(),
            Some(PathBuf::from("/xdg/fish/completions/deno.fish"))
        );
    }

    #[tokio::test]
    async fn exists_via_shell_env_or_path() {
        assert!(fish(MemorySystem::new("/h").with_env("SHELL", "/usr/bin/fish")).exists().await.unwrap());
        assert!(fish(MemorySystem::new("/h").with_executable("fish")).exists().await.unwrap());
        assert!(!fish(MemorySystem::new("/h")).exists().await.unwrap());
    }

    #[test]
    fn fish_overrides_env_script_and_source_command() {
        let shell = fish(MemorySystem::new("/home/u"));
        let script = shell.env_script(Path::new("/home/u/.deno"));

        assert_eq!(script.name, "env.fish");
        assert!(script.contents.contains(r#"if not contains "/home/u/.deno/bin" $PATH"#));
        assert!(script.contents.contains(r#"set -x PATH "/home/u/.deno/bin" $PATH"#));
        assert_eq!(
            shell.source_string(Path::new("/home/u/.deno")),
            r#"source "/home/u/.deno/env.fish""#
        );
    }

    #[tokio::test]
    async fn completions_need_no_rc_changes() {
        let shell = fish(MemorySystem::new("/home/u"));
        assert!(shell.completions_source_string().await.unwrap().is_none());
    }
}
