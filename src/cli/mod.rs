pub mod console;
pub mod output;
mod shell;

pub use console::{ConsoleTransport, TextChartRenderer, UnavailableSynthesis, UnavailableTranscription};
pub use shell::{run_cli, CliMode, CONSOLE_CHAT_ID, SCRIPT_ENV};
