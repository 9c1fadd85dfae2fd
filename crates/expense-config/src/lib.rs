//! expense-config
//!
//! Deployment settings for the expense assistant: currency, time zone, contacts,
//! job schedules and category overrides, plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{default_base_dir, ConfigManager, BASE_DIR_ENV};
pub use model::Config;
