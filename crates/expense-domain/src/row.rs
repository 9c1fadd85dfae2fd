//! Raw tabular rows exchanged with the ledger store.

use serde::{de, Deserialize, Deserializer, Serialize};

/// One ledger row as persisted: date, category, description, responsible,
/// formatted amount and an optional registration timestamp.
///
/// Deserialisation accepts the spreadsheet column headers used by older ledgers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerRow {
    #[serde(default, alias = "Data", alias = "Data da Despesa")]
    pub date: String,
    #[serde(default, alias = "Categoria")]
    pub category: String,
    #[serde(default, alias = "Descrição", alias = "Descricao")]
    pub description: String,
    #[serde(default, alias = "Responsável", alias = "Responsavel")]
    pub responsible: String,
    #[serde(default, alias = "Valor", deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(default, alias = "Registrado em", skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    match Raw::deserialize(deserializer) {
        Ok(Raw::Text(text)) => Ok(text),
        Ok(Raw::Integer(value)) => Ok(value.to_string()),
        Ok(Raw::Float(value)) => Ok(format!("{:.2}", value)),
        Err(_) => Err(de::Error::custom("amount must be a string or a number")),
    }
}
