use std::{
    io::{self, BufRead},
    sync::Arc,
};

use expense_config::{default_base_dir, Config, ConfigManager};
use expense_core::{Clock, InboundMessage, SystemClock};
use expense_domain::ChatId;
use expense_storage_json::JsonLedgerStore;
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::{error, info};

use super::{
    console::{ConsoleTransport, TextChartRenderer, UnavailableSynthesis, UnavailableTranscription},
    output,
};
use crate::{
    assistant::{Assistant, AssistantSettings, Collaborators},
    errors::CliError,
    scheduler::{CronScheduler, DailyJobs},
};

/// Set to any value to read commands from stdin without a prompt.
pub const SCRIPT_ENV: &str = "EXPENSE_BOT_CLI_SCRIPT";

/// Chat id of the person typing at the console.
pub const CONSOLE_CHAT_ID: ChatId = 0;

const EXIT_WORDS: &[&str] = &["sair", "exit", "quit"];
const PROMPT: &str = "despesas> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Exit,
}

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    if mode == CliMode::Script {
        colored::control::set_override(false);
    }

    let context = ShellContext::load()?;

    match mode {
        CliMode::Interactive => run_interactive(&context),
        CliMode::Script => run_script(&context),
    }
}

struct ShellContext {
    config: Config,
    clock: Arc<dyn Clock>,
    assistant: Arc<Assistant>,
}

impl ShellContext {
    fn load() -> Result<Self, CliError> {
        let base = default_base_dir();
        let config = ConfigManager::with_base_dir(base.clone())?.load()?;
        let ledger_path = config.resolve_ledger_path(&base);
        let store = JsonLedgerStore::new(ledger_path)?;
        info!(ledger = %store.path().display(), "ledger opened");

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let collaborators = Collaborators {
            transport: Arc::new(ConsoleTransport::new(CONSOLE_CHAT_ID)),
            store: Arc::new(store),
            transcriber: Arc::new(UnavailableTranscription),
            synthesizer: Arc::new(UnavailableSynthesis),
            charts: Arc::new(TextChartRenderer),
            clock: Arc::clone(&clock),
        };
        let settings = AssistantSettings::from_config(&config)?;
        Ok(Self {
            assistant: Arc::new(Assistant::new(collaborators, settings)),
            config,
            clock,
        })
    }

    fn start_scheduler(&self) -> Result<Option<CronScheduler>, CliError> {
        if !self.config.scheduler_enabled {
            return Ok(None);
        }
        let jobs = Arc::new(DailyJobs::new(
            Arc::clone(&self.assistant),
            self.config.contacts_with_env_overrides(),
        ));
        let mut scheduler =
            CronScheduler::new(self.assistant.settings().zone, Arc::clone(&self.clock));

        let reminders = Arc::clone(&jobs);
        scheduler.schedule("reminder", &self.config.reminder_schedule, move || {
            reminders.send_reminders();
        })?;
        scheduler.schedule("daily-summary", &self.config.daily_summary_schedule, move || {
            if let Err(err) = jobs.send_daily_summary() {
                error!(error = %err, "daily summary failed");
            }
        })?;
        Ok(Some(scheduler))
    }

    fn handle_line(&self, line: &str) -> LoopControl {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LoopControl::Continue;
        }
        if EXIT_WORDS.contains(&trimmed.to_lowercase().as_str()) {
            return LoopControl::Exit;
        }
        self.assistant
            .handle(InboundMessage::text(CONSOLE_CHAT_ID, trimmed));
        LoopControl::Continue
    }
}

fn run_interactive(context: &ShellContext) -> Result<(), CliError> {
    let scheduler = context.start_scheduler()?;
    let mut editor = DefaultEditor::new()?;
    output::info("Digite `ajuda` para ver os comandos e `sair` para encerrar.");

    let result = loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.trim()).ok();
                }
                if context.handle_line(&line) == LoopControl::Exit {
                    break Ok(());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("Até logo!");
                break Ok(());
            }
            Err(err) => break Err(err.into()),
        }
    };

    if let Some(scheduler) = scheduler {
        scheduler.shutdown();
    }
    result
}

fn run_script(context: &ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if context.handle_line(&line?) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}
