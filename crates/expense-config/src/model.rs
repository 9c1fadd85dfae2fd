use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use expense_domain::{CategoryRule, Contact};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Settings shared by the assistant, the scheduled jobs and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub currency_symbol: String,
    pub time_zone: String,
    /// Hint for transcription and speech synthesis.
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
    pub contacts: Vec<Contact>,
    /// Cron expression in the configured zone.
    pub reminder_schedule: String,
    pub daily_summary_schedule: String,
    pub scheduler_enabled: bool,
    pub audio_replies: bool,
    pub chart_category_limit: usize,
    pub chart_top_categories: usize,
    /// Replaces the built-in keyword table when present. Order is significant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryRule>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "R$".into(),
            time_zone: "America/Sao_Paulo".into(),
            language: "pt".into(),
            ledger_path: None,
            contacts: vec![Contact::new("Larissa", 0), Contact::new("Thiago", 0)],
            reminder_schedule: "0 0 20 * * * *".into(),
            daily_summary_schedule: "0 0 22 * * * *".into(),
            scheduler_enabled: true,
            audio_replies: false,
            chart_category_limit: 6,
            chart_top_categories: 5,
            categories: None,
        }
    }
}

impl Config {
    pub fn zone(&self) -> Result<Tz, ConfigError> {
        self.time_zone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimeZone(self.time_zone.clone()))
    }

    pub fn resolve_ledger_path(&self, base: &Path) -> PathBuf {
        match &self.ledger_path {
            Some(path) => path.clone(),
            None => base.join("ledger").join("ledger.json"),
        }
    }

    /// Contacts with chat ids replaced by `<NAME>_CHAT_ID` environment variables.
    pub fn contacts_with_env_overrides(&self) -> Vec<Contact> {
        self.contacts_with_overrides(|key| std::env::var(key).ok())
    }

    pub fn contacts_with_overrides<F>(&self, lookup: F) -> Vec<Contact>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.contacts
            .iter()
            .map(|contact| {
                let chat_id = lookup(&chat_id_variable(&contact.name))
                    .and_then(|value| value.trim().parse().ok())
                    .unwrap_or(contact.chat_id);
                Contact::new(contact.name.clone(), chat_id)
            })
            .collect()
    }
}

/// `Larissa` → `LARISSA_CHAT_ID`.
pub fn chat_id_variable(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_CHAT_ID", stem)
}
