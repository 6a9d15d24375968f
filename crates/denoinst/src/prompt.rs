use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, MultiSelect};
use denoinst_shell::Prompter;
use log::warn;

/// Asks on the terminal. A question that cannot be asked (no terminal,
/// interrupted input) takes its default answer.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> bool {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact();
        answer_or(answer, default, message)
    }

    fn multi_select(&mut self, message: &str, options: &[String]) -> Vec<usize> {
        let answer = MultiSelect::with_theme(&self.theme)
            .with_prompt(message)
            .items(options)
            .interact();
        answer_or(answer, Vec::new(), message)
    }
}

fn answer_or<T>(answer: dialoguer::Result<T>, default: T, question: &str) -> T {
    answer.unwrap_or_else(|error| {
        warn!("could not ask \"{question}\": {error}");
        default
    })
}
