//! Conversion between typed entries and raw ledger rows.

use chrono::{NaiveDate, NaiveDateTime};
use expense_domain::{
    format_date, ExpenseEntry, Installment, LedgerRow, DATE_FORMAT, FALLBACK_CATEGORY,
    TIMESTAMP_FORMAT,
};
use thiserror::Error;

use crate::value::ValueParser;

/// Why a stored row could not become an entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing date")]
    MissingDate,
    #[error("unreadable date `{0}`")]
    InvalidDate(String),
    #[error("unreadable or non-positive amount `{0}`")]
    InvalidAmount(String),
}

pub fn entry_to_row(entry: &ExpenseEntry, values: &ValueParser) -> LedgerRow {
    LedgerRow {
        date: format_date(entry.date),
        category: entry.category.clone(),
        description: entry.description.clone(),
        responsible: entry.responsible.clone(),
        amount: values.format(entry.amount),
        recorded_at: entry
            .recorded_at
            .map(|at| at.format(TIMESTAMP_FORMAT).to_string()),
    }
}

pub fn row_to_entry(row: &LedgerRow, values: &ValueParser) -> Result<ExpenseEntry, RowError> {
    let raw_date = row.date.trim();
    if raw_date.is_empty() {
        return Err(RowError::MissingDate);
    }
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw_date, "%Y-%m-%d"))
        .map_err(|_| RowError::InvalidDate(raw_date.to_string()))?;
    let amount = values.parse(&row.amount);
    if !amount.is_positive() {
        return Err(RowError::InvalidAmount(row.amount.clone()));
    }
    let category = match row.category.trim() {
        "" => FALLBACK_CATEGORY.to_string(),
        label => label.to_string(),
    };
    let mut entry = ExpenseEntry::new(
        date,
        category,
        row.description.trim(),
        row.responsible.trim(),
        amount,
    );
    entry.installment = installment_suffix(&entry.description);
    entry.recorded_at = row
        .recorded_at
        .as_deref()
        .and_then(|raw| NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok());
    Ok(entry)
}

/// Reads a trailing `[i/N]` marker from a stored description.
fn installment_suffix(description: &str) -> Option<Installment> {
    let inner = description.trim_end().strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (index, count) = inner[open + 1..].split_once('/')?;
    let index: u32 = index.trim().parse().ok()?;
    let count: u32 = count.trim().parse().ok()?;
    (index >= 1 && count > 1 && index <= count).then_some(Installment { index, count })
}
