mod cli;
mod logging;
mod prompt;

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use denoinst_platform::{HostOs, HostSystem, System};
use denoinst_shell::{SetupReport, manual_setup_instructions, setup_shells};
use log::{debug, warn};

use crate::cli::Cli;
use crate::prompt::TerminalPrompter;

const RESTART_NOTE: &str =
    "Deno was added to the PATH.\nYou may need to restart your shell for it to become available.";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return cli::handle_parse_error(error),
    };
    logging::init_logging(cli.verbose, cli.log_file.as_deref());

    if HostOs::current() == HostOs::Windows {
        debug!("PATH is configured by the Windows installer, nothing to do");
        return ExitCode::SUCCESS;
    }
    if !cli.yes && !(io::stdin().is_terminal() && io::stdout().is_terminal()) {
        debug!("not running in a terminal and --yes not given, skipping shell setup");
        return ExitCode::SUCCESS;
    }

    let options = cli.setup_options();
    let system: Arc<dyn System> = match HostSystem::new() {
        Ok(system) => Arc::new(system),
        Err(error) => {
            warn!("{error}");
            eprintln!("{}", manual_setup_instructions(&options.install_dir));
            return ExitCode::SUCCESS;
        }
    };

    let mut prompter = TerminalPrompter::default();
    match setup_shells(system, &options, &mut prompter).await {
        Ok(report) => print_report(&report, cli.json),
        Err(error) => {
            warn!("{error}");
            eprintln!("{}", manual_setup_instructions(&options.install_dir));
        }
    }
    ExitCode::SUCCESS
}

fn print_report(report: &SetupReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(error) => warn!("could not serialize the setup report: {error}"),
        }
        return;
    }

    print!("{}", report.summary());
    if report.path_configured() {
        println!("\n{RESTART_NOTE}");
    }
}
