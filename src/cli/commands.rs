//! Command table and dispatch for the shell.

use std::str::FromStr;

use strsim::levenshtein;
use uuid::Uuid;

use crate::cli::{output, render, CommandError};
use crate::config::Config;
use crate::core::{GroupMode, TransactionController, TransactionDraft};
use crate::domain::{Displayable, Identifiable};
use crate::utils::build_info;

const CHART_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub(crate) struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub(crate) const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "add",
        usage: "add <description> <amount> [YYYY-MM-DD]",
        summary: "Record an entry; negative amounts are expenses",
    },
    CommandSpec {
        name: "delete",
        usage: "delete <#position|id>",
        summary: "Remove an entry",
    },
    CommandSpec {
        name: "list",
        usage: "list",
        summary: "Show the history",
    },
    CommandSpec {
        name: "summary",
        usage: "summary",
        summary: "Show balance, income and expense",
    },
    CommandSpec {
        name: "chart",
        usage: "chart [day|week]",
        summary: "Show spending grouped by weekday or week",
    },
    CommandSpec {
        name: "view",
        usage: "view <day|week>",
        summary: "Select the chart grouping",
    },
    CommandSpec {
        name: "toggle",
        usage: "toggle",
        summary: "Switch between daily and weekly charts",
    },
    CommandSpec {
        name: "dashboard",
        usage: "dashboard",
        summary: "Show totals, chart and history together",
    },
    CommandSpec {
        name: "help",
        usage: "help [command]",
        summary: "List commands",
    },
    CommandSpec {
        name: "version",
        usage: "version",
        summary: "Show build information",
    },
    CommandSpec {
        name: "exit",
        usage: "exit",
        summary: "Save and leave the shell",
    },
];

/// Session state of the shell.
pub struct ShellContext {
    pub(crate) controller: TransactionController,
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    currency_symbol: String,
}

impl ShellContext {
    pub fn new(controller: TransactionController, config: &Config, mode: CliMode) -> Self {
        Self {
            controller,
            mode,
            running: true,
            currency_symbol: config.currency_symbol.clone(),
        }
    }

    pub fn controller(&self) -> &TransactionController {
        &self.controller
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = COMMANDS.iter().map(|spec| spec.name).collect();
        names.push("quit");
        names
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        match command {
            "add" => self.cmd_add(args),
            "delete" | "rm" => self.cmd_delete(args),
            "list" | "history" => self.cmd_list(),
            "summary" => self.cmd_summary(),
            "chart" => self.cmd_chart(args),
            "view" => self.cmd_view(args),
            "toggle" => self.cmd_toggle(),
            "dashboard" => self.cmd_dashboard(),
            "help" => self.cmd_help(args),
            "version" => {
                output::info(build_info::current().summary());
                Ok(LoopControl::Continue)
            }
            "exit" | "quit" => Ok(LoopControl::Exit),
            other => {
                self.suggest_command(other);
                Ok(LoopControl::Continue)
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            CommandError::Tracker(err) => output::error(err),
        }
    }

    fn cmd_add(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let (description, amount, date) = match args {
            [description, amount] => (*description, *amount, None),
            [description, amount, date] => (*description, *amount, Some(*date)),
            _ => return Err(usage_error("add")),
        };
        let mut draft = TransactionDraft::new(description, amount);
        if let Some(date) = date {
            draft = draft.with_date(date);
        }
        match self.controller.try_add(&draft) {
            Ok(Some(id)) => output::success(format!(
                "Added `{}` [{}].",
                draft.description.trim(),
                render::short_id(id)
            )),
            Ok(None) => output::warning("Entry not added."),
            Err(err) => output::warning(format!("Entry not added: {err}.")),
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_delete(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let [target] = args else {
            return Err(usage_error("delete"));
        };
        let Some(id) = self.resolve_target(target) else {
            output::warning(format!("No transaction matches `{target}`."));
            return Ok(LoopControl::Continue);
        };
        let label = self
            .controller
            .transaction(id)
            .map(|txn| txn.display_label())
            .unwrap_or_default();
        if self.controller.delete(id) {
            output::success(format!("Deleted {label}."));
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_list(&self) -> Result<LoopControl, CommandError> {
        output::section("history");
        let rows = render::history_rows(self.controller.transactions(), &self.currency_symbol);
        if rows.is_empty() {
            output::line(render::EMPTY_HISTORY);
        }
        for row in rows {
            output::ledger_line(&row, row.is_expense);
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_summary(&self) -> Result<LoopControl, CommandError> {
        output::section("totals");
        for line in render::totals_lines(&self.controller.totals(), &self.currency_symbol) {
            output::line(line);
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_chart(&self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let mode = match args {
            [] => self.controller.view(),
            [mode] => parse_mode(mode)?,
            _ => return Err(usage_error("chart")),
        };
        output::section(format!("spending analytics ({mode})"));
        for line in render::chart_lines(&self.controller.chart_for(mode), CHART_WIDTH) {
            output::line(line);
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_view(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let [mode] = args else {
            return Err(usage_error("view"));
        };
        let mode = parse_mode(mode)?;
        self.controller.set_view(mode);
        output::success(format!("Chart view set to {mode}."));
        Ok(LoopControl::Continue)
    }

    fn cmd_toggle(&mut self) -> Result<LoopControl, CommandError> {
        let mode = self.controller.toggle_view();
        output::success(format!("Chart view set to {mode}."));
        Ok(LoopControl::Continue)
    }

    fn cmd_dashboard(&self) -> Result<LoopControl, CommandError> {
        self.cmd_summary()?;
        self.cmd_chart(&[])?;
        self.cmd_list()
    }

    fn cmd_help(&self, args: &[&str]) -> Result<LoopControl, CommandError> {
        if let [name] = args {
            match find_spec(name) {
                Some(spec) => output::info(format!("{} - {}", spec.usage, spec.summary)),
                None => self.suggest_command(name),
            }
            return Ok(LoopControl::Continue);
        }
        output::section("commands");
        for spec in COMMANDS {
            output::line(format!("  {:<42} {}", spec.usage, spec.summary));
        }
        Ok(LoopControl::Continue)
    }

    /// `#3`/`3` picks by list position; anything else is a full id or a
    /// unique id prefix.
    fn resolve_target(&self, token: &str) -> Option<Uuid> {
        let transactions = self.controller.transactions();
        let positional = token.strip_prefix('#').unwrap_or(token);
        if let Ok(position) = positional.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|idx| transactions.get(idx))
                .map(|txn| txn.id());
        }
        if let Ok(id) = Uuid::from_str(token) {
            return Some(id);
        }
        let needle = token.to_ascii_lowercase().replace('-', "");
        if needle.is_empty() {
            return None;
        }
        let mut matches = transactions
            .iter()
            .map(|txn| txn.id())
            .filter(|id| id.simple().to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Some(id),
            _ => None,
        }
    }

    fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .command_names()
            .into_iter()
            .map(|name| (levenshtein(name, input), name))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }
}

fn find_spec(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

fn usage_error(name: &str) -> CommandError {
    let usage = find_spec(name).map(|spec| spec.usage).unwrap_or(name);
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

fn parse_mode(raw: &str) -> Result<GroupMode, CommandError> {
    raw.parse::<GroupMode>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}
