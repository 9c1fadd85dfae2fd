//! Totals and category breakdowns over a ledger snapshot.

use expense_domain::{AggregationQuery, AggregationResult, ExpenseEntry, LedgerRow};
use tracing::warn;

use crate::{rows::row_to_entry, value::ValueParser};

#[derive(Debug, Clone, Default)]
pub struct LedgerAggregator {
    values: ValueParser,
}

impl LedgerAggregator {
    pub fn new(values: ValueParser) -> Self {
        Self { values }
    }

    /// Applies the date window, then the responsible filter, and sums what survives.
    pub fn aggregate<'a, I>(entries: I, query: &AggregationQuery) -> AggregationResult
    where
        I: IntoIterator<Item = &'a ExpenseEntry>,
    {
        let mut result = AggregationResult::default();
        for entry in entries {
            if !query.window.contains(query.reference_date, entry.date) {
                continue;
            }
            if !query.responsible.matches(&entry.responsible) {
                continue;
            }
            result.record(&entry.category, entry.amount);
        }
        result
    }

    /// Aggregates raw store rows. Rows with a missing or unreadable date or amount
    /// are skipped with a warning and counted in `skipped_rows`.
    pub fn aggregate_rows(&self, rows: &[LedgerRow], query: &AggregationQuery) -> AggregationResult {
        let mut skipped = 0;
        let entries: Vec<ExpenseEntry> = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| match row_to_entry(row, &self.values) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    skipped += 1;
                    warn!(row = index, reason = %err, "skipping malformed ledger row");
                    None
                }
            })
            .collect();
        let mut result = Self::aggregate(&entries, query);
        result.skipped_rows = skipped;
        result
    }
}
