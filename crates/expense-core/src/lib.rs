//! expense-core
//!
//! Command interpretation and ledger aggregation for the expense assistant.
//! Depends on expense-domain. No terminal I/O and no concrete storage or network
//! collaborators; those are reached through the traits in [`collaborators`] and [`storage`].

pub mod aggregate;
pub mod category;
pub mod collaborators;
pub mod command;
pub mod date;
pub mod error;
pub mod installment;
pub mod report;
pub mod rows;
pub mod storage;
pub mod time;
pub mod value;


pub use aggregate::LedgerAggregator;
pub use category::{CategoryClassifier, CategoryTable};
pub use collaborators::*;
pub use command::{CommandParser, Intent, Registration, SummaryRequest};
pub use date::DateResolver;
pub use error::CoreError;
pub use installment::InstallmentPlan;
pub use report::{ChartSeries, RenderedReport, ReportFormatter};
pub use storage::{LedgerStore, MemoryLedgerStore};
pub use time::{Clock, FixedClock, SystemClock};
pub use value::ValueParser;
