use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
    Reply,
    Attachment,
}

fn build_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Error => "[x]",
        MessageKind::Reply => "",
        MessageKind::Attachment => "[+]",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let label = build_label(kind);
    let formatted = if label.is_empty() {
        text
    } else {
        format!("{label} {text}")
    };
    match kind {
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Reply => formatted.bright_green().to_string(),
        MessageKind::Attachment => formatted.bright_cyan().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    println!("{}", apply_style(kind, message));
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

/// Assistant replies, one block per delivered message.
pub fn reply(message: impl fmt::Display) {
    print(MessageKind::Reply, message);
}

pub fn attachment(message: impl fmt::Display) {
    print(MessageKind::Attachment, message);
}
