//! Expense entries and the unvalidated drafts they are built from.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Position of one row inside an installment-split purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Installment {
    pub index: u32,
    pub count: u32,
}

impl Installment {
    /// Suffix appended to installment descriptions, e.g. `[2/3]`.
    pub fn ordinal(&self) -> String {
        format!("[{}/{}]", self.index, self.count)
    }
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ordinal())
    }
}

/// One recorded expense. Never mutated after it reaches the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseEntry {
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub responsible: String,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment: Option<Installment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<NaiveDateTime>,
}

impl ExpenseEntry {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        responsible: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            date,
            category: category.into(),
            description: description.into(),
            responsible: responsible.into(),
            amount,
            installment: None,
            recorded_at: None,
        }
    }

    pub fn with_installment(mut self, installment: Installment) -> Self {
        self.installment = Some(installment);
        self
    }

    pub fn recorded(mut self, at: NaiveDateTime) -> Self {
        self.recorded_at = Some(at);
        self
    }

    pub fn installment_index(&self) -> u32 {
        self.installment.map(|i| i.index).unwrap_or(1)
    }

    pub fn installment_count(&self) -> u32 {
        self.installment.map(|i| i.count).unwrap_or(1)
    }
}

/// A registration command split into its positional fields, not yet validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub responsible: String,
    /// `None` means the command omitted the date and "today" applies.
    pub date_token: Option<String>,
    pub description: String,
    pub amount_literal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_entry_counts_as_single_installment() {
        let entry = ExpenseEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            "LAZER",
            "CINEMA",
            "ANA",
            Money::from_cents(4000),
        );
        assert_eq!(entry.installment_index(), 1);
        assert_eq!(entry.installment_count(), 1);
    }

    #[test]
    fn installment_ordinal_uses_brackets() {
        let installment = Installment { index: 2, count: 3 };
        assert_eq!(installment.ordinal(), "[2/3]");
    }
}
