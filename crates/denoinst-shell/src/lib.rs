#![allow(clippy::missing_errors_doc)]

mod backup;
mod completions;
mod env_files;
mod error;
mod rc_file;
mod report;
mod script;
mod setup;

pub mod shells;

pub use backup::Backups;
pub use completions::{CompletionOutcome, write_completion_files, write_completion_rc_commands};
pub use env_files::{EnvFilesResult, write_env_files};
pub use error::ShellSetupError;
pub use rc_file::{RcEdit, RcFileOutcome, RcUpdate, plan_rc_edit, update_rc_file};
pub use report::{CompletionReport, PathUpdate, RcFileChange, SetupReport, ShellReport};
pub use script::{ShellScript, sh_env_script, sh_source_string};
pub use setup::{Prompter, SetupOptions, get_available_shells, manual_setup_instructions, setup_shells};
pub use shells::{CompletionSupport, ShellKind, UnixShell, all_shells};
