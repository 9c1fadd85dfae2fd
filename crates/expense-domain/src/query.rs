//! Summary queries and their aggregated results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Rolling time range a summary covers, counted back from the reference date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AggregationWindow {
    #[default]
    Unbounded,
    Today,
    Week,
    Month,
    Days(u32),
}

impl AggregationWindow {
    /// Number of days subtracted from the reference date, `None` when unrestricted.
    pub fn days(self) -> Option<u32> {
        match self {
            AggregationWindow::Unbounded => None,
            AggregationWindow::Today => Some(0),
            AggregationWindow::Week => Some(7),
            AggregationWindow::Month => Some(30),
            AggregationWindow::Days(days) => Some(days),
        }
    }

    /// Inclusive `[start, end]` bounds relative to `reference`.
    pub fn bounds(self, reference: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        self.days()
            .map(|days| (reference - Duration::days(i64::from(days)), reference))
    }

    pub fn contains(self, reference: NaiveDate, date: NaiveDate) -> bool {
        match self.bounds(reference) {
            Some((start, end)) => date >= start && date <= end,
            None => true,
        }
    }
}

impl fmt::Display for AggregationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationWindow::Unbounded => f.write_str("geral"),
            AggregationWindow::Today => f.write_str("hoje"),
            AggregationWindow::Week => f.write_str("semana"),
            AggregationWindow::Month => f.write_str("mês"),
            AggregationWindow::Days(days) => write!(f, "últimos {} dias", days),
        }
    }
}

/// Restricts a summary to one responsible party, compared case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ResponsibleFilter {
    #[default]
    All,
    Named(String),
}

impl ResponsibleFilter {
    pub fn named(name: impl Into<String>) -> Self {
        ResponsibleFilter::Named(name.into().trim().to_uppercase())
    }

    pub fn matches(&self, responsible: &str) -> bool {
        match self {
            ResponsibleFilter::All => true,
            ResponsibleFilter::Named(name) => {
                name.trim().to_lowercase() == responsible.trim().to_lowercase()
            }
        }
    }
}

/// One summary request. Lives only for the request that built it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregationQuery {
    pub window: AggregationWindow,
    pub responsible: ResponsibleFilter,
    pub reference_date: NaiveDate,
}

impl AggregationQuery {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            window: AggregationWindow::Unbounded,
            responsible: ResponsibleFilter::All,
            reference_date,
        }
    }

    pub fn with_window(mut self, window: AggregationWindow) -> Self {
        self.window = window;
        self
    }

    pub fn for_responsible(mut self, responsible: ResponsibleFilter) -> Self {
        self.responsible = responsible;
        self
    }
}

/// Category subtotal with its share of the grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub label: String,
    pub amount: Money,
    pub percent: f64,
}

/// Totals computed fresh for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationResult {
    pub total: Money,
    pub by_category: BTreeMap<String, Money>,
    pub matched_count: usize,
    /// Rows dropped because their date or amount could not be read.
    pub skipped_rows: usize,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.matched_count == 0
    }

    pub fn record(&mut self, category: &str, amount: Money) {
        self.total += amount;
        *self.by_category.entry(category.to_string()).or_default() += amount;
        self.matched_count += 1;
    }

    /// Percentage of the total held by `category`; zero when the total is zero.
    pub fn percent_of(&self, category: &str) -> f64 {
        self.by_category
            .get(category)
            .map(|amount| amount.percent_of(self.total))
            .unwrap_or(0.0)
    }

    /// Categories ordered by descending subtotal, ties broken by label.
    pub fn ranked_categories(&self) -> Vec<CategoryShare> {
        let mut shares: Vec<CategoryShare> = self
            .by_category
            .iter()
            .map(|(label, amount)| CategoryShare {
                label: label.clone(),
                amount: *amount,
                percent: amount.percent_of(self.total),
            })
            .collect();
        shares.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.label.cmp(&b.label)));
        shares
    }
}
