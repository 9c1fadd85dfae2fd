mod common;

use std::sync::Arc;

use common::{broken_store_assistant, harness, harness_with, Delivery, RecordingTransport};
use expense_bot::{AssistantSettings, Outcome};
use expense_core::{ChartKind, InboundMessage, LedgerStore};
use expense_domain::{CategoryRule, LedgerRow, Money};

const CHAT: i64 = 77;

#[test]
fn registration_is_appended_and_confirmed() {
    let h = harness();
    let outcome = h
        .assistant
        .handle(InboundMessage::text(CHAT, "Ana, hoje, Mercado, 150"));
    assert!(matches!(
        outcome,
        Outcome::Registered { entries: 1, total, .. } if total == Money::from_cents(15000)
    ));

    let rows = h.store.read_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "10/05/2024");
    assert_eq!(rows[0].category, "ALIMENTAÇÃO");
    assert_eq!(rows[0].responsible, "ANA");
    assert_eq!(rows[0].amount, "R$150,00");
    assert_eq!(rows[0].recorded_at.as_deref(), Some("10/05/2024 15:00:00"));

    let texts = h.transport.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Despesa registrada"));
}

#[test]
fn installments_are_written_as_one_batch() {
    let h = harness();
    h.assistant
        .handle(InboundMessage::text(CHAT, "Ana, Mercado, 300, 3x"));

    let rows = h.store.read_all().unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["10/05/2024", "10/06/2024", "10/07/2024"]);
    assert!(rows.iter().all(|r| r.amount == "R$100,00"));
    assert_eq!(rows[2].description, "MERCADO [3/3]");

    let confirmation = &h.transport.texts()[0];
    assert!(confirmation.contains("R$300,00"));
    assert!(confirmation.contains("3 x 100,00"));
}

#[test]
fn parse_errors_get_a_corrective_reply_and_no_write() {
    let h = harness();
    for input in ["Ana, 150", "Ana, mercado, abc", "Ana, 31/02/2024, mercado, 10", "Ana, tv, 10, 0x"] {
        assert_eq!(h.assistant.handle(InboundMessage::text(CHAT, input)), Outcome::Corrected);
    }
    assert!(h.store.is_empty());
    let texts = h.transport.texts();
    assert_eq!(texts.len(), 4);
    assert!(texts.iter().all(|t| t.contains("Exemplo")));
    assert!(texts[1].contains("\"abc\""));
}

#[test]
fn oversized_amounts_are_corrected_and_skipped_in_summaries() {
    let h = harness();
    for input in ["Ana, tv, 90000000000000000, 3x", "Ana, tv, 50000000000000000"] {
        assert_eq!(h.assistant.handle(InboundMessage::text(CHAT, input)), Outcome::Corrected);
    }
    assert!(h.store.is_empty());

    let hand_edited = LedgerRow {
        date: "10/05/2024".into(),
        category: "LAZER".into(),
        description: "TV".into(),
        responsible: "ANA".into(),
        amount: "50000000000000000".into(),
        recorded_at: None,
    };
    h.store
        .append_all(vec![hand_edited.clone(), hand_edited])
        .unwrap();
    h.assistant
        .handle(InboundMessage::text(CHAT, "Ana, hoje, Mercado, 150"));

    let outcome = h.assistant.handle(InboundMessage::text(CHAT, "resumo geral"));
    assert_eq!(
        outcome,
        Outcome::Summarized {
            total: Money::from_cents(15000),
            matched: 1
        }
    );
}

#[test]
fn greetings_and_unknown_text_get_help() {
    let h = harness();
    assert_eq!(h.assistant.handle(InboundMessage::text(CHAT, "oi")), Outcome::Help);
    assert_eq!(
        h.assistant.handle(InboundMessage::text(CHAT, "quanto gastei?")),
        Outcome::Help
    );
    assert_eq!(h.transport.texts().len(), 2);
}

#[test]
fn summary_sends_text_then_chart() {
    let h = harness();
    h.assistant
        .handle(InboundMessage::text(CHAT, "Ana, hoje, Mercado, 150"));
    h.assistant
        .handle(InboundMessage::text(CHAT, "Thiago, ontem, uber, 50"));

    let outcome = h.assistant.handle(InboundMessage::text(CHAT, "resumo geral"));
    assert_eq!(
        outcome,
        Outcome::Summarized {
            total: Money::from_cents(20000),
            matched: 2
        }
    );
    let deliveries = h.transport.all();
    let tail = &deliveries[deliveries.len() - 2..];
    match tail {
        [Delivery::Text(_, text), Delivery::Photo(_, caption)] => {
            assert!(text.contains("ALIMENTAÇÃO: R$150,00 (75.0%)"));
            assert!(text.contains("Total: R$200,00"));
            assert_eq!(caption, "Resumo Geral");
        }
        other => panic!("unexpected deliveries {other:?}"),
    }
    assert_eq!(*h.charts.kinds.lock().unwrap(), vec![ChartKind::Pie]);
}

#[test]
fn category_summary_uses_bar_chart_and_person_filter_narrows() {
    let h = harness();
    h.assistant
        .handle(InboundMessage::text(CHAT, "Ana, hoje, Mercado, 150"));
    h.assistant
        .handle(InboundMessage::text(CHAT, "Thiago, hoje, uber, 50"));

    h.assistant
        .handle(InboundMessage::text(CHAT, "resumo por categoria"));
    assert_eq!(h.charts.kinds.lock().unwrap().last(), Some(&ChartKind::Bar));

    let outcome = h
        .assistant
        .handle(InboundMessage::text(CHAT, "resumo do mês do thiago"));
    assert_eq!(
        outcome,
        Outcome::Summarized {
            total: Money::from_cents(5000),
            matched: 1
        }
    );
}

#[test]
fn empty_summary_sends_text_without_chart() {
    let h = harness();
    h.assistant.handle(InboundMessage::text(CHAT, "resumo hoje"));
    let deliveries = h.transport.all();
    assert_eq!(deliveries.len(), 1);
    assert!(matches!(&deliveries[0], Delivery::Text(_, text) if text.contains("Nenhuma despesa")));
}

#[test]
fn persistence_failure_asks_to_retry() {
    let transport = Arc::new(RecordingTransport::default());
    let assistant = broken_store_assistant(transport.clone());
    assert_eq!(
        assistant.handle(InboundMessage::text(CHAT, "Ana, mercado, 10")),
        Outcome::Failed
    );
    assert_eq!(
        assistant.handle(InboundMessage::text(CHAT, "resumo geral")),
        Outcome::Failed
    );
    let texts = transport.texts();
    assert_eq!(texts.len(), 2);
    assert!(texts.iter().all(|t| !t.contains("spreadsheet offline")));
    assert_eq!(texts[0], texts[1]);
}

#[test]
fn audio_is_transcribed_before_parsing() {
    let h = harness_with(
        RecordingTransport::default(),
        AssistantSettings::default(),
        Some("Ana, hoje, padaria, 12,50".into()),
    );
    let outcome = h.assistant.handle(InboundMessage::audio(CHAT, vec![1, 2, 3]));
    assert!(matches!(outcome, Outcome::Registered { entries: 1, .. }));
    assert_eq!(h.store.read_all().unwrap()[0].amount, "R$12,50");
}

#[test]
fn failed_transcription_is_a_corrective_reply() {
    let h = harness();
    let outcome = h.assistant.handle(InboundMessage::audio(CHAT, vec![0; 8]));
    assert_eq!(outcome, Outcome::Corrected);
    assert!(h.transport.texts()[0].contains("áudio"));
    assert!(h.store.is_empty());
}

#[test]
fn audio_replies_follow_text_when_enabled() {
    let settings = AssistantSettings {
        audio_replies: true,
        ..AssistantSettings::default()
    };
    let h = harness_with(RecordingTransport::default(), settings, None);
    h.assistant
        .handle(InboundMessage::text(CHAT, "Ana, mercado, 10"));
    let deliveries = h.transport.all();
    assert!(matches!(deliveries[0], Delivery::Text(..)));
    assert!(matches!(deliveries[1], Delivery::Audio(CHAT, bytes) if bytes > 0));
}

#[test]
fn delivery_failure_does_not_undo_the_write() {
    let h = harness_with(RecordingTransport::refusing(CHAT), AssistantSettings::default(), None);
    let outcome = h
        .assistant
        .handle(InboundMessage::text(CHAT, "Ana, mercado, 10"));
    assert!(matches!(outcome, Outcome::Registered { .. }));
    assert_eq!(h.store.len(), 1);
}

#[test]
fn configured_categories_replace_the_builtin_table() {
    let settings = AssistantSettings {
        categories: Some(vec![CategoryRule::new("pets", ["ração"])]),
        ..AssistantSettings::default()
    };
    let h = harness_with(RecordingTransport::default(), settings, None);
    h.assistant
        .handle(InboundMessage::text(CHAT, "Ana, ração do cachorro, 90"));
    h.assistant
        .handle(InboundMessage::text(CHAT, "Ana, mercado, 10"));
    let rows = h.store.read_all().unwrap();
    assert_eq!(rows[0].category, "PETS");
    assert_eq!(rows[1].category, "OUTROS");
}
