//! Turns one raw chat message into an intent.
//!
//! Recognition order, first match wins: help keywords, `resumo ...` summary
//! phrases, comma-separated registration, anything else is unrecognized.

use chrono::NaiveDate;
use expense_domain::{
    AggregationQuery, AggregationWindow, ExpenseDraft, ExpenseEntry, Money, ResponsibleFilter,
};

use crate::{
    category::CategoryClassifier,
    collaborators::ChartKind,
    date::DateResolver,
    installment::{InstallmentPlan, MAX_INSTALLMENTS},
    value::ValueParser,
    CoreError,
};

const HELP_KEYWORDS: &[&str] = &[
    "ajuda", "help", "oi", "ola", "olá", "menu", "comandos", "start", "/start", "/help", "/ajuda",
];

const SUMMARY_KEYWORD: &str = "resumo";

const SUMMARY_FORMS: &str = "resumo geral, resumo hoje, resumo da semana, resumo do mês, \
resumo <N> dias, resumo por categoria, resumo da <nome>";

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Help,
    Summary(SummaryRequest),
    Register(Registration),
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub query: AggregationQuery,
    pub title: String,
    pub chart: ChartKind,
}

/// A validated registration, expanded into the entries to append.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub draft: ExpenseDraft,
    pub plan: InstallmentPlan,
    pub category: String,
    pub description: String,
    pub responsible: String,
    pub entries: Vec<ExpenseEntry>,
}

impl Registration {
    pub fn total(&self) -> Money {
        self.plan.total
    }

    pub fn per_installment(&self) -> Money {
        self.plan.per_installment()
    }
}

/// Stateless parser; holds only read-only collaborators.
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    values: ValueParser,
    dates: DateResolver,
    classifier: CategoryClassifier,
}

impl CommandParser {
    pub fn new(values: ValueParser, dates: DateResolver, classifier: CategoryClassifier) -> Self {
        Self {
            values,
            dates,
            classifier,
        }
    }

    pub fn dates(&self) -> &DateResolver {
        &self.dates
    }

    pub fn parse(&self, input: &str, reference: NaiveDate) -> Result<Intent, CoreError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Intent::Unrecognized);
        }
        if is_help(trimmed) {
            return Ok(Intent::Help);
        }
        if trimmed.to_lowercase().starts_with(SUMMARY_KEYWORD) {
            return parse_summary(trimmed, reference).map(Intent::Summary);
        }
        if trimmed.contains(',') {
            let draft = split_draft(trimmed)?;
            return self.register(draft, reference).map(Intent::Register);
        }
        Ok(Intent::Unrecognized)
    }

    /// Validates a draft and expands it into entries. Nothing is built until the
    /// amount is known to be strictly positive.
    pub fn register(&self, draft: ExpenseDraft, reference: NaiveDate) -> Result<Registration, CoreError> {
        if draft.responsible.is_empty() {
            return Err(CoreError::MalformedCommand("responsável vazio".into()));
        }
        if draft.description.is_empty() {
            return Err(CoreError::MalformedCommand("descrição vazia".into()));
        }
        let count = match draft.installment_token.as_deref() {
            Some(token) => parse_installment_count(token)?,
            None => 1,
        };
        let total = self.values.parse(&draft.amount_literal);
        if !total.is_positive() {
            return Err(CoreError::InvalidAmount(draft.amount_literal.clone()));
        }
        let base_date = match draft.date_token.as_deref() {
            Some(token) => self.dates.resolve(token, reference)?,
            None => reference,
        };
        let category = self.classifier.classify(&draft.description);
        let description = draft.description.to_uppercase();
        let responsible = draft.responsible.to_uppercase();
        let plan = InstallmentPlan::new(base_date, total, count);
        let entries = plan.expand(&category, &description, &responsible);
        Ok(Registration {
            draft,
            plan,
            category,
            description,
            responsible,
            entries,
        })
    }
}

fn is_help(text: &str) -> bool {
    let first = text
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    HELP_KEYWORDS.contains(&first.as_str())
}

/// Positional split: `responsible, description, amount`,
/// `responsible, date, description, amount` or
/// `responsible, description, amount, Nx`.
///
/// When the decimal-aware split yields the wrong field count, a plain comma split
/// is tried before giving up, so `Thiago,99,50` reads as three fields.
fn split_draft(text: &str) -> Result<ExpenseDraft, CoreError> {
    let fields = split_fields(text);
    let found = fields.len();
    draft_from_fields(fields)
        .or_else(|_| draft_from_fields(text.split(',').map(|f| f.trim().to_string()).collect()))
        .map_err(|_| {
            CoreError::MalformedCommand(format!(
                "esperava 3 ou 4 campos separados por vírgula, recebi {}",
                found
            ))
        })
}

fn draft_from_fields(fields: Vec<String>) -> Result<ExpenseDraft, Vec<String>> {
    match <[String; 3]>::try_from(fields) {
        Ok([responsible, description, amount_literal]) => Ok(ExpenseDraft {
            responsible,
            date_token: None,
            description,
            amount_literal,
            installment_token: None,
        }),
        Err(fields) => match <[String; 4]>::try_from(fields)? {
            [responsible, second, third, last] if looks_like_installment(&last) => Ok(ExpenseDraft {
                responsible,
                date_token: None,
                description: second,
                amount_literal: third,
                installment_token: Some(last),
            }),
            [responsible, second, third, last] => Ok(ExpenseDraft {
                responsible,
                date_token: Some(second),
                description: third,
                amount_literal: last,
                installment_token: None,
            }),
        },
    }
}

/// Splits on commas, except a comma between digits that is followed by one or two
/// digits and then the end of the field, which is a decimal comma (`50,00`).
fn split_fields(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut fields = Vec::new();
    let mut current = String::new();
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ',' && !is_decimal_comma(&chars, i) {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn is_decimal_comma(chars: &[char], at: usize) -> bool {
    let before = at.checked_sub(1).and_then(|i| chars.get(i));
    if !before.is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits = chars[at + 1..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if !(1..=2).contains(&digits) {
        return false;
    }
    match chars.get(at + 1 + digits) {
        None => true,
        Some(c) => *c == ',' || c.is_whitespace(),
    }
}

fn looks_like_installment(token: &str) -> bool {
    let lowered = token.trim().to_lowercase();
    match lowered.strip_suffix('x') {
        Some(prefix) if !prefix.is_empty() => {
            prefix.chars().any(|c| c.is_ascii_digit()) && !prefix.chars().any(char::is_alphabetic)
        }
        _ => false,
    }
}

fn parse_installment_count(token: &str) -> Result<u32, CoreError> {
    let invalid = || CoreError::InvalidInstallmentToken(token.to_string());
    let lowered = token.trim().to_lowercase();
    let digits = lowered.strip_suffix('x').ok_or_else(invalid)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let count: u32 = digits.parse().map_err(|_| invalid())?;
    if count == 0 || count > MAX_INSTALLMENTS {
        return Err(invalid());
    }
    Ok(count)
}

fn parse_summary(text: &str, reference: NaiveDate) -> Result<SummaryRequest, CoreError> {
    let cleaned = text.trim_end_matches(['?', '!', '.', ' ']);
    let mut tokens = cleaned.split_whitespace();
    let malformed = || {
        CoreError::MalformedCommand(format!("resumo desconhecido; use {}", SUMMARY_FORMS))
    };
    if tokens.next().map(fold).as_deref() != Some(SUMMARY_KEYWORD) {
        return Err(malformed());
    }
    let raw: Vec<&str> = tokens.collect();
    let folded: Vec<String> = raw.iter().map(|token| fold(token)).collect();
    let words: Vec<&str> = folded.iter().map(String::as_str).collect();

    let (window, mut title, chart, consumed) = match words.as_slice() {
        [] => (AggregationWindow::Unbounded, "Resumo Geral".to_string(), ChartKind::Pie, 0),
        ["geral", ..] => (AggregationWindow::Unbounded, "Resumo Geral".into(), ChartKind::Pie, 1),
        ["hoje", ..] | ["do", "dia", ..] => {
            let used = if words[0] == "hoje" { 1 } else { 2 };
            (AggregationWindow::Today, "Resumo de Hoje".into(), ChartKind::Pie, used)
        }
        ["de", "hoje", ..] => (AggregationWindow::Today, "Resumo de Hoje".into(), ChartKind::Pie, 2),
        ["da", "semana", ..] => (AggregationWindow::Week, "Resumo da Semana".into(), ChartKind::Pie, 2),
        ["semana", ..] => (AggregationWindow::Week, "Resumo da Semana".into(), ChartKind::Pie, 1),
        ["do", "mes", ..] => (AggregationWindow::Month, "Resumo do Mês".into(), ChartKind::Pie, 2),
        ["mes", ..] => (AggregationWindow::Month, "Resumo do Mês".into(), ChartKind::Pie, 1),
        ["por", "categoria", ..] | ["por", "categorias", ..] => (
            AggregationWindow::Unbounded,
            "Resumo por Categoria".into(),
            ChartKind::Bar,
            2,
        ),
        [count, "dias", ..] => {
            let days = parse_days(count).ok_or_else(malformed)?;
            (AggregationWindow::Days(days), days_title(days), ChartKind::Pie, 2)
        }
        ["dos", "ultimos", count, "dias", ..] => {
            let days = parse_days(count).ok_or_else(malformed)?;
            (AggregationWindow::Days(days), days_title(days), ChartKind::Pie, 4)
        }
        ["da" | "do" | "de", ..] => (AggregationWindow::Unbounded, "Resumo".into(), ChartKind::Pie, 0),
        _ => return Err(malformed()),
    };

    let responsible = match &raw[consumed..] {
        [] => ResponsibleFilter::All,
        [article, name @ ..] if !name.is_empty() && is_article(article) => {
            let name = name.join(" ");
            title = format!("{} - {}", title, name.to_uppercase());
            ResponsibleFilter::named(name)
        }
        _ => return Err(malformed()),
    };
    if responsible == ResponsibleFilter::All && consumed == 0 && !words.is_empty() {
        return Err(malformed());
    }

    Ok(SummaryRequest {
        query: AggregationQuery::new(reference)
            .with_window(window)
            .for_responsible(responsible),
        title,
        chart,
    })
}

fn is_article(word: &str) -> bool {
    matches!(word.to_lowercase().as_str(), "da" | "do" | "de")
}

fn parse_days(word: &str) -> Option<u32> {
    word.parse().ok().filter(|days| *days <= 3660)
}

fn days_title(days: u32) -> String {
    format!("Resumo dos Últimos {} Dias", days)
}

/// Lower-cases and strips Portuguese diacritics, one char for one char.
fn fold(word: &str) -> String {
    word.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
