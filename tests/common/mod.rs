#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use expense_bot::{Assistant, AssistantSettings, Collaborators};
use expense_core::{
    ChartKind, ChartRenderer, ChartSeries, CoreError, FixedClock, LedgerStore, MemoryLedgerStore,
    MessageTransport, SpeechSynthesisService, TranscriptionService,
};
use expense_domain::{ChatId, LedgerRow};

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Text(ChatId, String),
    Photo(ChatId, String),
    Audio(ChatId, usize),
}

/// Records every delivery; optionally refuses one chat.
#[derive(Default)]
pub struct RecordingTransport {
    pub deliveries: Mutex<Vec<Delivery>>,
    pub refuse: Option<ChatId>,
}

impl RecordingTransport {
    pub fn refusing(chat_id: ChatId) -> Self {
        Self {
            refuse: Some(chat_id),
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .filter_map(|d| match d {
                Delivery::Text(_, text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn all(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    fn record(&self, chat_id: ChatId, delivery: Delivery) -> Result<(), CoreError> {
        if self.refuse == Some(chat_id) {
            return Err(CoreError::Delivery(format!("chat {chat_id} unreachable")));
        }
        self.deliveries.lock().unwrap().push(delivery);
        Ok(())
    }
}

impl MessageTransport for RecordingTransport {
    fn deliver(&self, chat_id: ChatId, text: &str) -> Result<(), CoreError> {
        self.record(chat_id, Delivery::Text(chat_id, text.to_string()))
    }

    fn deliver_photo(&self, chat_id: ChatId, _image: &[u8], caption: &str) -> Result<(), CoreError> {
        self.record(chat_id, Delivery::Photo(chat_id, caption.to_string()))
    }

    fn deliver_audio(&self, chat_id: ChatId, audio: &[u8]) -> Result<(), CoreError> {
        self.record(chat_id, Delivery::Audio(chat_id, audio.len()))
    }
}

/// Returns a fixed transcript, or fails when none is set.
pub struct ScriptedTranscriber(pub Option<String>);

impl TranscriptionService for ScriptedTranscriber {
    fn transcribe(&self, _audio: &[u8], language_hint: &str) -> Result<String, CoreError> {
        assert_eq!(language_hint, "pt");
        self.0
            .clone()
            .ok_or_else(|| CoreError::TranscriptionFailed("inaudible".into()))
    }
}

pub struct EchoSynthesizer;

impl SpeechSynthesisService for EchoSynthesizer {
    fn synthesize(&self, text: &str, _language: &str) -> Result<Vec<u8>, CoreError> {
        Ok(text.as_bytes().to_vec())
    }
}

#[derive(Default)]
pub struct RecordingCharts {
    pub kinds: Mutex<Vec<ChartKind>>,
    pub fail: bool,
}

impl ChartRenderer for RecordingCharts {
    fn render(&self, kind: ChartKind, _title: &str, series: &ChartSeries) -> Result<Vec<u8>, CoreError> {
        if self.fail {
            return Err(CoreError::ChartRendering("no backend".into()));
        }
        self.kinds.lock().unwrap().push(kind);
        Ok(vec![0; series.len()])
    }
}

/// Store whose appends always fail.
#[derive(Default)]
pub struct BrokenStore;

impl LedgerStore for BrokenStore {
    fn read_all(&self) -> Result<Vec<LedgerRow>, CoreError> {
        Err(CoreError::Persistence("spreadsheet offline".into()))
    }

    fn append_all(&self, _rows: Vec<LedgerRow>) -> Result<(), CoreError> {
        Err(CoreError::Persistence("spreadsheet offline".into()))
    }
}

pub struct Harness {
    pub transport: Arc<RecordingTransport>,
    pub store: Arc<MemoryLedgerStore>,
    pub charts: Arc<RecordingCharts>,
    pub assistant: Arc<Assistant>,
}

/// 2024-05-10 15:00 in São Paulo.
pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap()))
}

pub fn harness() -> Harness {
    harness_with(RecordingTransport::default(), AssistantSettings::default(), None)
}

pub fn harness_with(
    transport: RecordingTransport,
    settings: AssistantSettings,
    transcript: Option<String>,
) -> Harness {
    let transport = Arc::new(transport);
    let store = Arc::new(MemoryLedgerStore::new());
    let charts = Arc::new(RecordingCharts::default());
    let collaborators = Collaborators {
        transport: transport.clone(),
        store: store.clone(),
        transcriber: Arc::new(ScriptedTranscriber(transcript)),
        synthesizer: Arc::new(EchoSynthesizer),
        charts: charts.clone(),
        clock: clock(),
    };
    Harness {
        transport,
        store,
        charts,
        assistant: Arc::new(Assistant::new(collaborators, settings)),
    }
}

pub fn broken_store_assistant(transport: Arc<RecordingTransport>) -> Assistant {
    let collaborators = Collaborators {
        transport,
        store: Arc::new(BrokenStore),
        transcriber: Arc::new(ScriptedTranscriber(None)),
        synthesizer: Arc::new(EchoSynthesizer),
        charts: Arc::new(RecordingCharts::default()),
        clock: clock(),
    };
    Assistant::new(collaborators, AssistantSettings::default())
}
