use expense_config::ConfigError;
use expense_core::CoreError;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Failures that end the CLI process.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Ledger error: {0}")]
    Core(#[from] CoreError),
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid cron expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },
    #[error("could not start scheduler thread: {0}")]
    Spawn(std::io::Error),
}
