//! Locale-formatted currency strings to [`Money`] and back.

use expense_domain::Money;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "R$";

/// Reads and renders amounts written with `.` grouping and `,` decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueParser {
    currency_symbol: String,
}

impl Default for ValueParser {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl ValueParser {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Parses a user or ledger literal. Returns zero when the text is not a number
    /// or exceeds [`Money::MAX_ACCEPTED`], so callers must treat a zero result as a
    /// validation failure.
    ///
    /// With both `.` and `,` present, `.` groups thousands and `,` marks decimals.
    /// A lone `,` is the decimal mark; a lone `.` is left as the decimal mark.
    pub fn parse(&self, raw: &str) -> Money {
        let without_symbol = if self.currency_symbol.is_empty() {
            raw.to_string()
        } else {
            raw.replace(self.currency_symbol.as_str(), "")
        };
        let compact: String = without_symbol.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.starts_with('-') {
            return Money::zero();
        }
        let mut cleaned: String = compact
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
            .collect();
        if cleaned.contains(',') && cleaned.contains('.') {
            cleaned = cleaned.replace('.', "").replace(',', ".");
        } else if cleaned.contains(',') {
            cleaned = cleaned.replace(',', ".");
        }
        decimal_to_cents(&cleaned)
            .map(Money::from_cents)
            .filter(|amount| *amount <= Money::MAX_ACCEPTED)
            .unwrap_or_default()
    }

    /// Renders `R$1.234,56`.
    pub fn format(&self, amount: Money) -> String {
        let body = format_grouped(amount);
        match body.strip_prefix('-') {
            Some(unsigned) => format!("-{}{}", self.currency_symbol, unsigned),
            None => format!("{}{}", self.currency_symbol, body),
        }
    }

    /// Renders `1.234,56` without the currency symbol.
    pub fn format_plain(&self, amount: Money) -> String {
        format_grouped(amount)
    }
}

fn decimal_to_cents(text: &str) -> Option<i64> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (text, ""),
    };
    if frac_part.contains('.') || (int_part.is_empty() && frac_part.is_empty()) {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let units: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let digits: Vec<u32> = frac_part.chars().filter_map(|c| c.to_digit(10)).collect();
    let mut cents = i64::from(digits.first().copied().unwrap_or(0)) * 10
        + i64::from(digits.get(1).copied().unwrap_or(0));
    if digits.get(2).copied().unwrap_or(0) >= 5 {
        cents += 1;
    }
    units.checked_mul(100)?.checked_add(cents)
}

fn format_grouped(amount: Money) -> String {
    let sign = if amount.cents() < 0 { "-" } else { "" };
    let units = amount.units().abs().to_string();
    let mut grouped = String::new();
    for (count, ch) in units.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, '.');
        }
        grouped.insert(0, ch);
    }
    format!("{}{},{:02}", sign, grouped, amount.cents_part())
}
