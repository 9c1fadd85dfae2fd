use serde::{Deserialize, Serialize};

/// Identifier of a conversation on the messaging transport.
pub type ChatId = i64;

/// A person who receives scheduled reminders and daily summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub chat_id: ChatId,
}

impl Contact {
    pub fn new(name: impl Into<String>, chat_id: ChatId) -> Self {
        Self {
            name: name.into(),
            chat_id,
        }
    }
}
