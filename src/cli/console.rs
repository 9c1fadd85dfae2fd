//! Console stand-ins for the chat transport, chart renderer and audio services.

use expense_core::{
    ChartKind, ChartRenderer, ChartSeries, CoreError, MessageTransport, SpeechSynthesisService,
    TranscriptionService,
};
use expense_domain::ChatId;

use super::output;

const BAR_WIDTH: usize = 30;

/// Prints deliveries to stdout. Messages for other chats carry a header.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleTransport {
    console_chat: ChatId,
}

impl ConsoleTransport {
    pub fn new(console_chat: ChatId) -> Self {
        Self { console_chat }
    }

    fn header(&self, chat_id: ChatId) {
        if chat_id != self.console_chat {
            output::info(format!("-> chat {}", chat_id));
        }
    }
}

impl MessageTransport for ConsoleTransport {
    fn deliver(&self, chat_id: ChatId, text: &str) -> Result<(), CoreError> {
        self.header(chat_id);
        output::reply(text);
        Ok(())
    }

    fn deliver_photo(&self, chat_id: ChatId, image: &[u8], caption: &str) -> Result<(), CoreError> {
        self.header(chat_id);
        output::attachment(caption);
        match std::str::from_utf8(image) {
            Ok(text) => output::info(text),
            Err(_) => output::info(format!("<imagem de {} bytes>", image.len())),
        }
        Ok(())
    }

    fn deliver_audio(&self, chat_id: ChatId, audio: &[u8]) -> Result<(), CoreError> {
        self.header(chat_id);
        output::attachment(format!("<áudio de {} bytes>", audio.len()));
        Ok(())
    }
}

/// Draws charts as text: one proportional bar per label.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChartRenderer;

impl TextChartRenderer {
    pub fn draw(&self, kind: ChartKind, title: &str, series: &ChartSeries) -> Result<String, CoreError> {
        if series.is_empty() || series.labels.len() != series.values.len() {
            return Err(CoreError::ChartRendering(format!(
                "{} labels for {} values",
                series.labels.len(),
                series.values.len()
            )));
        }
        let total: f64 = series.values.iter().sum();
        let max = series.values.iter().cloned().fold(0.0_f64, f64::max);
        let width = series.labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);

        let mut lines = vec![format!("{} ({})", title, kind)];
        for (label, value) in series.labels.iter().zip(&series.values) {
            let (scale, suffix) = match kind {
                ChartKind::Pie => (total, format!("{:.1}%", percent(*value, total))),
                ChartKind::Bar | ChartKind::Line => (max, format!("{:.2}", value)),
            };
            let filled = if scale > 0.0 {
                ((value / scale) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            lines.push(format!(
                "{:<width$} {} {}",
                label,
                "#".repeat(filled.min(BAR_WIDTH)),
                suffix,
                width = width
            ));
        }
        Ok(lines.join("\n"))
    }
}

fn percent(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

impl ChartRenderer for TextChartRenderer {
    fn render(&self, kind: ChartKind, title: &str, series: &ChartSeries) -> Result<Vec<u8>, CoreError> {
        self.draw(kind, title, series).map(String::into_bytes)
    }
}

/// No speech-to-text backend is wired to the console.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTranscription;

impl TranscriptionService for UnavailableTranscription {
    fn transcribe(&self, _audio: &[u8], _language_hint: &str) -> Result<String, CoreError> {
        Err(CoreError::TranscriptionFailed(
            "no transcription backend configured".into(),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSynthesis;

impl SpeechSynthesisService for UnavailableSynthesis {
    fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>, CoreError> {
        Err(CoreError::Synthesis("no speech synthesis backend configured".into()))
    }
}
