//! Relative, partial and absolute date tokens resolved in the ledger's zone.

use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;

use crate::{time::Clock, CoreError};

pub const DEFAULT_ZONE: Tz = chrono_tz::America::Sao_Paulo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateResolver {
    zone: Tz,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE)
    }
}

impl DateResolver {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Today's date in the ledger zone.
    pub fn reference_date(&self, clock: &dyn Clock) -> NaiveDate {
        clock.today_in(self.zone)
    }

    /// Resolves `hoje`/`today`, `ontem`/`yesterday`, `DD/MM` and `DD/MM/YYYY`,
    /// in that order, against `reference`.
    pub fn resolve(&self, token: &str, reference: NaiveDate) -> Result<NaiveDate, CoreError> {
        let normalized = token.trim().to_lowercase();
        match normalized.as_str() {
            "hoje" | "today" => return Ok(reference),
            "ontem" | "yesterday" => return Ok(reference - Duration::days(1)),
            _ => {}
        }
        let invalid = || CoreError::InvalidDateToken(token.trim().to_string());
        let parts: Vec<&str> = normalized.split('/').collect();
        let (day, month, year) = match parts.as_slice() {
            [day, month] => (
                numeric(day, 1, 2).ok_or_else(invalid)?,
                numeric(month, 1, 2).ok_or_else(invalid)?,
                reference.year(),
            ),
            [day, month, year] => (
                numeric(day, 1, 2).ok_or_else(invalid)?,
                numeric(month, 1, 2).ok_or_else(invalid)?,
                numeric(year, 4, 4).ok_or_else(invalid)? as i32,
            ),
            _ => return Err(invalid()),
        };
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }
}

fn numeric(text: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if text.len() < min_len || text.len() > max_len || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
