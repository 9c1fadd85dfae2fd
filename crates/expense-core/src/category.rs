//! Keyword-driven category inference.

use std::sync::Arc;

use expense_domain::{CategoryRule, FALLBACK_CATEGORY};
use once_cell::sync::Lazy;

/// Built-in table, in tie-break order.
static DEFAULT_TABLE: Lazy<CategoryTable> = Lazy::new(|| {
    CategoryTable::new(vec![
        CategoryRule::new(
            "alimentação",
            ["mercado", "supermercado", "pão", "leite", "feira", "comida"],
        ),
        CategoryRule::new(
            "transporte",
            [
                "uber",
                "99",
                "ônibus",
                "metro",
                "trem",
                "corrida",
                "combustível",
                "gasolina",
            ],
        ),
        CategoryRule::new("lazer", ["cinema", "netflix", "bar", "show", "festa", "lazer"]),
        CategoryRule::new(
            "moradia",
            ["aluguel", "condominio", "energia", "água", "internet", "luz"],
        ),
        CategoryRule::new(
            "saúde",
            ["farmácia", "higiene", "produto de limpeza", "remédio"],
        ),
    ])
});

/// Ordered list of category rules. The first rule with a matching keyword wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl CategoryTable {
    /// Labels are upper-cased and keywords lower-cased, as [`CategoryRule::new`] does.
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| CategoryRule::new(rule.label, rule.keywords))
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        DEFAULT_TABLE.clone()
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.label.as_str())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Maps free-text descriptions to category labels. Shared read-only across requests.
#[derive(Debug, Clone, Default)]
pub struct CategoryClassifier {
    table: Arc<CategoryTable>,
}

impl CategoryClassifier {
    pub fn new(table: CategoryTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn classify(&self, description: &str) -> String {
        let lowered = description.to_lowercase();
        self.table
            .rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
    }
}
