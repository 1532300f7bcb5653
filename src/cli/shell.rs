use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Context as ReadlineContext, Editor, Helper,
};
use shell_words::split;

use crate::cli::commands::{CliMode, LoopControl, ShellContext};
use crate::cli::{output, CliError};
use crate::config::ConfigManager;
use crate::core::TransactionController;
use crate::storage::JsonFileStore;

/// Set to run commands from stdin without prompts or colors.
pub const SCRIPT_ENV: &str = "EXPENSE_CORE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        output::disable_colors();
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    let storage = JsonFileStore::new(config.resolve_data_dir(config_manager.base_dir()))?;
    let controller = TransactionController::open(Box::new(storage), config.storage_key.as_str())
        .with_week_start(config.week_start)
        .with_view(config.default_view);

    let mut context = ShellContext::new(controller, &config, mode);

    match context.mode {
        CliMode::Interactive => run_interactive(&mut context)?,
        CliMode::Script => run_script(&mut context)?,
    }

    context.controller.flush()?;
    Ok(())
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    let helper = CommandHelper::new(context.command_names());
    editor.set_helper(Some(helper));

    output::info("Type `help` to see available commands.");

    loop {
        if !context.running {
            break;
        }
        let prompt = format!("expenses ({})> ", context.controller.view());
        match editor.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                editor.add_history_entry(trimmed).ok();

                if handle_line(context, trimmed) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        if handle_line(context, &line) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> LoopControl {
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not read `{}`: {err}.", line.trim()));
            return LoopControl::Continue;
        }
    };

    let Some((raw, rest)) = tokens.split_first() else {
        return LoopControl::Continue;
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    match context.dispatch(&command, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            LoopControl::Exit
        }
        Ok(LoopControl::Continue) => LoopControl::Continue,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}

/// Completes and hints command names; arguments are free text.
struct CommandHelper {
    commands: Vec<&'static str>,
}

impl CommandHelper {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    /// Command names extending the word under the cursor, or nothing once an
    /// argument is being typed.
    fn matches<'a>(&'a self, line: &str, pos: usize) -> impl Iterator<Item = &'static str> + 'a {
        let typed = &line[..pos];
        let word = if typed.contains(char::is_whitespace) {
            None
        } else {
            Some(typed.to_ascii_lowercase())
        };
        self.commands
            .iter()
            .copied()
            .filter(move |name| word.as_deref().is_some_and(|word| name.starts_with(word)))
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .matches(line, pos)
            .map(|name| Pair {
                display: name.to_string(),
                replacement: format!("{name} "),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos == 0 || pos < line.len() {
            return None;
        }
        let mut matches = self.matches(line, pos);
        match (matches.next(), matches.next()) {
            (Some(only), None) if only.len() > pos => Some(only[pos..].to_string()),
            _ => None,
        }
    }
}

impl Highlighter for CommandHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for CommandHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CommandHelper {
        CommandHelper::new(vec!["delete", "dashboard", "add", "exit", "add"])
    }

    #[test]
    fn command_word_completes_by_prefix() {
        let names: Vec<_> = helper().matches("d", 1).collect();
        assert_eq!(names, vec!["dashboard", "delete"]);
        assert_eq!(helper().matches("DE", 2).collect::<Vec<_>>(), vec!["delete"]);
    }

    #[test]
    fn arguments_are_not_completed() {
        assert_eq!(helper().matches("add d", 5).count(), 0);
    }

    #[test]
    fn quoted_descriptions_stay_together() {
        let tokens = split(r#"add "team lunch" -42.10 2024-03-01"#).unwrap();
        assert_eq!(tokens, vec!["add", "team lunch", "-42.10", "2024-03-01"]);
    }
}
