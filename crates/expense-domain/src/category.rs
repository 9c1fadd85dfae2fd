//! Category labels and keyword rules.

use serde::{Deserialize, Serialize};

/// Label assigned when no keyword rule matches a description.
pub const FALLBACK_CATEGORY: &str = "OUTROS";

/// Maps one category label to the lower-cased keyword substrings that select it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<I, S>(label: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into().to_uppercase(),
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.into().to_lowercase())
                .collect(),
        }
    }

    /// Returns `true` when any keyword is a substring of the already lower-cased text.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && lowered.contains(keyword.as_str()))
    }
}
