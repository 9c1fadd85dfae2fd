//! Splitting one purchase into monthly installment entries.

use chrono::NaiveDate;
use expense_domain::{shift_month, ExpenseEntry, Installment, Money};

/// Upper bound on `Nx` tokens; larger counts are rejected as malformed.
pub const MAX_INSTALLMENTS: u32 = 120;

/// A total amount spread over `count` monthly installments from `base_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentPlan {
    pub base_date: NaiveDate,
    pub total: Money,
    pub count: u32,
}

impl InstallmentPlan {
    pub fn new(base_date: NaiveDate, total: Money, count: u32) -> Self {
        Self {
            base_date,
            total,
            count: count.max(1),
        }
    }

    pub fn is_split(&self) -> bool {
        self.count > 1
    }

    /// Total divided by the count, rounded to the cent.
    pub fn per_installment(&self) -> Money {
        self.total.split_even(self.count)
    }

    /// Date of the 1-based installment `index`: one calendar month after the previous.
    pub fn due_date(&self, index: u32) -> NaiveDate {
        shift_month(self.base_date, index.saturating_sub(1) as i32)
    }

    /// Builds the ledger entries. `description` must already be normalised.
    pub fn expand(
        &self,
        category: &str,
        description: &str,
        responsible: &str,
    ) -> Vec<ExpenseEntry> {
        if !self.is_split() {
            return vec![ExpenseEntry::new(
                self.base_date,
                category,
                description,
                responsible,
                self.total,
            )];
        }
        let amount = self.per_installment();
        (1..=self.count)
            .map(|index| {
                let installment = Installment {
                    index,
                    count: self.count,
                };
                ExpenseEntry::new(
                    self.due_date(index),
                    category,
                    format!("{} {}", description, installment.ordinal()),
                    responsible,
                    amount,
                )
                .with_installment(installment)
            })
            .collect()
    }
}
