//! Request pipeline: one inbound message in, replies out.
//!
//! [`Assistant::handle`] is the only place errors stop travelling. Parse errors
//! become corrective replies and leave the ledger untouched. Infrastructure
//! errors are logged with context and answered with a generic retry message.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use expense_config::{Config, ConfigError};
use expense_core::{
    rows::entry_to_row, CategoryClassifier, CategoryTable, ChartKind, ChartRenderer, ChartSeries,
    Clock, CommandParser, CoreError, DateResolver, InboundMessage, Intent, LedgerAggregator,
    LedgerStore, MessageTransport, Registration, ReportFormatter, SpeechSynthesisService,
    SummaryRequest, TranscriptionService, ValueParser,
};
use expense_domain::{AggregationQuery, AggregationResult, CategoryRule, ChatId, LedgerRow, Money};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// External services the assistant talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn MessageTransport>,
    pub store: Arc<dyn LedgerStore>,
    pub transcriber: Arc<dyn TranscriptionService>,
    pub synthesizer: Arc<dyn SpeechSynthesisService>,
    pub charts: Arc<dyn ChartRenderer>,
    pub clock: Arc<dyn Clock>,
}

/// Read-only settings fixed at startup.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub zone: Tz,
    pub language: String,
    pub currency_symbol: String,
    pub audio_replies: bool,
    pub chart_category_limit: usize,
    pub chart_top_categories: usize,
    pub categories: Option<Vec<CategoryRule>>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            zone: expense_core::date::DEFAULT_ZONE,
            language: config.language,
            currency_symbol: config.currency_symbol,
            audio_replies: config.audio_replies,
            chart_category_limit: config.chart_category_limit,
            chart_top_categories: config.chart_top_categories,
            categories: None,
        }
    }
}

impl AssistantSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            zone: config.zone()?,
            language: config.language.clone(),
            currency_symbol: config.currency_symbol.clone(),
            audio_replies: config.audio_replies,
            chart_category_limit: config.chart_category_limit,
            chart_top_categories: config.chart_top_categories,
            categories: config.categories.clone(),
        })
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Help,
    Registered { batch: Uuid, entries: usize, total: Money },
    Summarized { total: Money, matched: usize },
    /// The user was told how to fix the command; nothing was written.
    Corrected,
    /// An infrastructure failure; the user was asked to retry later.
    Failed,
}

pub struct Assistant {
    collaborators: Collaborators,
    settings: AssistantSettings,
    parser: CommandParser,
    aggregator: LedgerAggregator,
    formatter: ReportFormatter,
    values: ValueParser,
}

impl Assistant {
    pub fn new(collaborators: Collaborators, settings: AssistantSettings) -> Self {
        let values = ValueParser::new(settings.currency_symbol.clone());
        let table = match &settings.categories {
            Some(rules) if !rules.is_empty() => CategoryTable::new(rules.clone()),
            _ => CategoryTable::builtin(),
        };
        let parser = CommandParser::new(
            values.clone(),
            DateResolver::new(settings.zone),
            CategoryClassifier::new(table),
        );
        let formatter = ReportFormatter::new(values.clone())
            .with_chart_limits(settings.chart_category_limit, settings.chart_top_categories);
        Self {
            aggregator: LedgerAggregator::new(values.clone()),
            collaborators,
            settings,
            parser,
            formatter,
            values,
        }
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn formatter(&self) -> &ReportFormatter {
        &self.formatter
    }

    /// Ledger-zone calendar date right now.
    pub fn today(&self) -> NaiveDate {
        self.collaborators.clock.today_in(self.settings.zone)
    }

    pub fn handle(&self, message: InboundMessage) -> Outcome {
        let request = Uuid::new_v4();
        let span = info_span!("message", chat_id = message.chat_id, %request);
        let _entered = span.enter();

        let chat_id = message.chat_id;
        let text = match self.inbound_text(&message) {
            Ok(text) => text,
            Err(err) => return self.recover(chat_id, "<audio>", err),
        };
        match self.dispatch(chat_id, &text) {
            Ok(outcome) => outcome,
            Err(err) => self.recover(chat_id, &text, err),
        }
    }

    /// Reads the ledger and aggregates it. Rows that cannot be read are skipped.
    pub fn summarize(&self, query: &AggregationQuery) -> Result<AggregationResult, CoreError> {
        let rows = self.collaborators.store.read_all()?;
        Ok(self.aggregator.aggregate_rows(&rows, query))
    }

    /// Delivers text, logging a failure instead of returning it.
    pub fn deliver(&self, chat_id: ChatId, text: &str) -> bool {
        match self.collaborators.transport.deliver(chat_id, text) {
            Ok(()) => true,
            Err(err) => {
                error!(chat_id, error = %err, "message delivery failed");
                false
            }
        }
    }

    fn inbound_text(&self, message: &InboundMessage) -> Result<String, CoreError> {
        let Some(audio) = message.audio.as_deref() else {
            return Ok(message.text.clone().unwrap_or_default());
        };
        match self
            .collaborators
            .transcriber
            .transcribe(audio, &self.settings.language)
        {
            Ok(text) => {
                debug!(bytes = audio.len(), transcript = %text, "audio transcribed");
                Ok(text)
            }
            Err(err) => {
                warn!(bytes = audio.len(), error = %err, "transcription failed");
                Err(match err {
                    CoreError::TranscriptionFailed(_) => err,
                    other => CoreError::TranscriptionFailed(other.to_string()),
                })
            }
        }
    }

    fn dispatch(&self, chat_id: ChatId, text: &str) -> Result<Outcome, CoreError> {
        let reference = self.today();
        match self.parser.parse(text, reference)? {
            Intent::Help | Intent::Unrecognized => {
                self.deliver(chat_id, &self.formatter.help_text());
                Ok(Outcome::Help)
            }
            Intent::Register(registration) => self.register(chat_id, text, registration),
            Intent::Summary(request) => self.reply_summary(chat_id, request),
        }
    }

    fn register(
        &self,
        chat_id: ChatId,
        command: &str,
        registration: Registration,
    ) -> Result<Outcome, CoreError> {
        let batch = Uuid::new_v4();
        let recorded_at = self.collaborators.clock.local_now(self.settings.zone);
        let rows: Vec<LedgerRow> = registration
            .entries
            .iter()
            .map(|entry| entry_to_row(&entry.clone().recorded(recorded_at), &self.values))
            .collect();
        let count = rows.len();
        if let Err(err) = self.collaborators.store.append_all(rows) {
            error!(
                %batch,
                command,
                draft = ?registration.draft,
                error = %err,
                "ledger append failed"
            );
            return Err(err);
        }
        info!(%batch, rows = count, total = %registration.total(), "expense registered");

        let confirmation = self.formatter.confirmation(&registration);
        self.deliver(chat_id, &confirmation);
        self.speak(chat_id, &confirmation);
        Ok(Outcome::Registered {
            batch,
            entries: count,
            total: registration.total(),
        })
    }

    fn reply_summary(&self, chat_id: ChatId, request: SummaryRequest) -> Result<Outcome, CoreError> {
        let result = self.summarize(&request.query)?;
        let report = self.formatter.render(&result, &request.title);
        info!(
            window = %request.query.window,
            matched = result.matched_count,
            skipped = result.skipped_rows,
            "summary rendered"
        );
        self.deliver(chat_id, &report.summary_text);
        self.send_chart(chat_id, request.chart, &request.title, &report.series);
        self.speak(chat_id, &report.summary_text);
        Ok(Outcome::Summarized {
            total: result.total,
            matched: result.matched_count,
        })
    }

    /// Charts are best effort; failures never reach the user.
    pub fn send_chart(&self, chat_id: ChatId, kind: ChartKind, title: &str, series: &ChartSeries) {
        if series.is_empty() {
            return;
        }
        let image = match self.collaborators.charts.render(kind, title, series) {
            Ok(image) => image,
            Err(err) => {
                error!(chat_id, chart = %kind, error = %err, "chart rendering failed");
                return;
            }
        };
        if let Err(err) = self.collaborators.transport.deliver_photo(chat_id, &image, title) {
            error!(chat_id, error = %err, "chart delivery failed");
        }
    }

    fn speak(&self, chat_id: ChatId, text: &str) {
        if !self.settings.audio_replies {
            return;
        }
        let audio = match self
            .collaborators
            .synthesizer
            .synthesize(text, &self.settings.language)
        {
            Ok(audio) => audio,
            Err(err) => {
                error!(chat_id, error = %err, "speech synthesis failed");
                return;
            }
        };
        if let Err(err) = self.collaborators.transport.deliver_audio(chat_id, &audio) {
            error!(chat_id, error = %err, "audio delivery failed");
        }
    }

    fn recover(&self, chat_id: ChatId, command: &str, err: CoreError) -> Outcome {
        if err.is_user_error() {
            debug!(command, error = %err, "command rejected");
            self.deliver(chat_id, &self.formatter.correction(&err));
            Outcome::Corrected
        } else {
            error!(command, error = %err, "request failed");
            self.deliver(chat_id, &self.formatter.retry_later());
            Outcome::Failed
        }
    }
}
