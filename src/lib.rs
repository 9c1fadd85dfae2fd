#![doc(test(attr(deny(warnings))))]

//! Expense Bot is a conversational expense ledger: chat messages register
//! expenses (optionally split into installments) and ask for summaries.
//! The parsing and aggregation engine lives in `expense-core`; this crate wires
//! it to storage, configuration, scheduled jobs and a console front end.

pub mod assistant;
pub mod cli;
pub mod errors;
pub mod scheduler;
pub mod utils;

pub use assistant::{Assistant, AssistantSettings, Collaborators, Outcome};
pub use scheduler::{CronScheduler, DailyJobs};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Bot tracing initialized.");
    });
}
