use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::BoolishValueParser;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use denoinst_shell::SetupOptions;

/// Add an installed deno to the PATH of every shell found on this machine.
#[derive(Parser, Debug)]
#[command(name = "denoinst", version)]
pub struct Cli {
    /// Directory deno was installed into
    #[arg(value_name = "INSTALL_DIR", value_parser = parse_install_dir)]
    pub install_dir: PathBuf,

    /// Skip prompts and accept the defaults
    #[arg(short, long, env = "DENO_INSTALL_YES", value_parser = BoolishValueParser::new())]
    pub yes: bool,

    /// Don't edit shell configs to add deno to the PATH
    #[arg(long, env = "DENO_INSTALL_NO_MODIFY_PATH", value_parser = BoolishValueParser::new())]
    pub no_modify_path: bool,

    /// Binary used to generate completions [default: <INSTALL_DIR>/bin/deno]
    #[arg(long, value_name = "PATH")]
    pub deno_bin: Option<PathBuf>,

    /// Print what was done as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn setup_options(&self) -> SetupOptions {
        SetupOptions {
            install_dir: self.install_dir.clone(),
            skip_prompts: self.yes,
            no_modify_path: self.no_modify_path,
            deno_binary: self.deno_bin.clone(),
        }
    }
}

fn parse_install_dir(value: &str) -> Result<PathBuf, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("install directory must not be empty".to_string());
    }
    Ok(PathBuf::from(trimmed))
}

/// The offending flag of an unknown-argument error.
pub fn unknown_flag(error: &clap::Error) -> Option<String> {
    if error.kind() != ErrorKind::UnknownArgument {
        return None;
    }
    match error.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(flag)) => Some(flag.clone()),
        _ => None,
    }
}

/// Report a command line that could not be parsed. Help and version requests
/// exit normally.
pub fn handle_parse_error(error: clap::Error) -> ExitCode {
    let Some(flag) = unknown_flag(&error) else {
        error.exit();
    };

    let _ = Cli::command().print_help();
    eprintln!("\nUnknown flag {flag}. Shell will not be configured");
    ExitCode::FAILURE
}
