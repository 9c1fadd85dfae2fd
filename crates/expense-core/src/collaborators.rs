//! Narrow contracts for the external services the assistant talks to.

use std::fmt;

use expense_domain::ChatId;

use crate::{report::ChartSeries, CoreError};

/// A message arriving from the chat transport. Audio, when present, replaces the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub text: Option<String>,
    pub audio: Option<Vec<u8>>,
}

impl InboundMessage {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: Some(text.into()),
            audio: None,
        }
    }

    pub fn audio(chat_id: ChatId, audio: Vec<u8>) -> Self {
        Self {
            chat_id,
            text: None,
            audio: Some(audio),
        }
    }
}

/// Outbound side of the chat transport.
pub trait MessageTransport: Send + Sync {
    fn deliver(&self, chat_id: ChatId, text: &str) -> Result<(), CoreError>;
    fn deliver_photo(&self, chat_id: ChatId, image: &[u8], caption: &str) -> Result<(), CoreError>;
    fn deliver_audio(&self, chat_id: ChatId, audio: &[u8]) -> Result<(), CoreError>;
}

/// Speech-to-text. Fails with [`CoreError::TranscriptionFailed`].
pub trait TranscriptionService: Send + Sync {
    fn transcribe(&self, audio: &[u8], language_hint: &str) -> Result<String, CoreError>;
}

/// Text-to-speech.
pub trait SpeechSynthesisService: Send + Sync {
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, CoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        };
        f.write_str(label)
    }
}

/// Rasterises a category series into an image blob.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, kind: ChartKind, title: &str, series: &ChartSeries) -> Result<Vec<u8>, CoreError>;
}
