use std::path::Path;

use denoinst_platform::{InstallLayout, System, is_permission_denied};
use log::info;

use crate::error::ShellSetupError;

/// A script written into the install directory, e.g. the `env` file.
/// Two scripts are the same script when name and contents match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScript {
    pub name: String,
    pub contents: String,
}

impl ShellScript {
    #[must_use]
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Write the script to `install_dir`. Returns `Ok(false)` if the write
    /// was refused for lack of permission.
    pub async fn write(
        &self,
        system: &dyn System,
        install_dir: &Path,
    ) -> Result<bool, ShellSetupError> {
        let path = InstallLayout::new(install_dir).script_path(&self.name);
        match system.write(&path, &self.contents).await {
            Ok(()) => {
                info!("wrote {} script to {}", self.name, path.display());
                Ok(true)
            }
            Err(error) if is_permission_denied(&error) => Ok(false),
            Err(source) => Err(ShellSetupError::EnvScript {
                name: self.name.clone(),
                path,
                source,
            }),
        }
    }
}

/// PATH setup for `sh` compatible shells.
#[must_use]
pub fn sh_env_script(install_dir: &Path) -> ShellScript {
    let install_dir = install_dir.display();
    ShellScript::new(
        "env",
        format!(
            r#"#!/bin/sh
# deno shell setup; adapted from rustup
# affix colons on either side of $PATH to simplify matching
case ":${{PATH}}:" in
    *:"{install_dir}/bin":*)
        ;;
    *)
        # Prepending path in case a system-installed deno executable needs to be overridden
        export PATH="{install_dir}/bin:$PATH"
        ;;
esac
"#
        ),
    )
}

/// Command sourcing [`sh_env_script`] from an rc file.
#[must_use]
pub fn sh_source_string(install_dir: &Path) -> String {
    format!(r#". "{}/env""#, install_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use denoinst_platform::MemorySystem;

    #[test]
    fn sh_env_script_guards_path_membership() {
        let script = sh_env_script(Path::new("/home/u/.deno"));

        assert_eq!(script.name, "env");
        assert!(script.contents.starts_with("#!/bin/sh\n"));
        assert!(script.contents.contains(r#"case ":${PATH}:" in"#));
        assert!(script.contents.contains(r#"*:"/home/u/.deno/bin":*)"#));
        assert!(
            script
                .contents
                .contains(r#"export PATH="/home/u/.deno/bin:$PATH""#)
        );
    }

    #[test]
    fn sh_source_string_dot_sources_env() {
        assert_eq!(
            sh_source_string(Path::new("/home/u/.deno")),
            r#". "/home/u/.deno/env""#
        );
    }

    #[test]
    fn equality_is_structural() {
        let a = ShellScript::new("env", "x");
        assert_eq!(a, ShellScript::new("env", "x"));
        assert_ne!(a, ShellScript::new("env", "y"));
        assert_ne!(a, ShellScript::new("env.fish", "x"));
    }

    #[tokio::test]
    async fn write_lands_at_the_layout_script_path() {
        let system = MemorySystem::new("/home/u").with_dir("/home/u/.deno");
        let layout = InstallLayout::new("/home/u/.deno");
        let script = ShellScript::new("env.fish", "set -x PATH");

        assert!(script.write(&system, layout.root()).await.unwrap());
        assert_eq!(system.writes(), [layout.script_path("env.fish")]);
        assert_eq!(
            system.file(layout.script_path("env.fish")).as_deref(),
            Some("set -x PATH")
        );
    }

    #[tokio::test]
    async fn permission_denied_write_is_soft() {
        let system = MemorySystem::new("/home/u").with_protected("/opt/deno");
        let script = sh_env_script(Path::new("/opt/deno"));

        let written = script
            .write(&system, Path::new("/opt/deno"))
            .await
            .expect("permission denial is not an error");
        assert!(!written);
    }

    #[tokio::test]
    async fn other_write_failures_carry_context() {
        let system = MemorySystem::new("/home/u")
            .with_dir("/home/u/.deno")
            .with_failing("/home/u/.deno/env");
        let script = sh_env_script(Path::new("/home/u/.deno"));

        let error = script
            .write(&system, Path::new("/home/u/.deno"))
            .await
            .expect_err("simulated failure");
        assert!(error.to_string().contains("Failed to write env file"));
    }
}
