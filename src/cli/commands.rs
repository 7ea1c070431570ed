// Slash command parsing and formatting

use std::path::PathBuf;

use crate::export::ExportFormat;
use crate::locale::Language;
use crate::session::InteractionLog;
use crate::templates::TemplateEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    History,
    Clear,
    New,
    Export {
        format: ExportFormat,
        path: Option<PathBuf>,
    },
    Language(Option<String>),
    Voice,
    Stop,
    Templates,
    Mail {
        to: String,
        document: String,
    },
    Status,
    /// Recognised command with bad arguments; carries the usage line
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    /// Parse a slash command. Plain text (a query) yields `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if !input.starts_with('/') {
            return None;
        }

        let mut parts = input.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let command = match name {
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            "/history" => Command::History,
            "/clear" => Command::Clear,
            "/new" => Command::New,
            "/export" => match args.as_slice() {
                [format] | [format, _] => match ExportFormat::parse(format) {
                    Some(format) => Command::Export {
                        format,
                        path: args.get(1).map(PathBuf::from),
                    },
                    None => Command::Usage(EXPORT_USAGE),
                },
                _ => Command::Usage(EXPORT_USAGE),
            },
            "/lang" | "/language" => {
                let wanted = args.join(" ");
                Command::Language((!wanted.is_empty()).then_some(wanted))
            }
            "/voice" => Command::Voice,
            "/stop" => Command::Stop,
            "/templates" => Command::Templates,
            "/mail" => match args.as_slice() {
                [to, document] => Command::Mail {
                    to: to.to_string(),
                    document: document.to_string(),
                },
                _ => Command::Usage(MAIL_USAGE),
            },
            "/status" => Command::Status,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

const EXPORT_USAGE: &str = "Usage: /export csv|pdf [path]";
const MAIL_USAGE: &str = "Usage: /mail <email> <document.pdf>";

pub fn format_help() -> String {
    r#"Available commands:
  /help                     - Show this help message
  /history                  - Show the interaction history
  /clear                    - Clear the interaction history
  /new                      - Start a new conversation (history and context)
  /export csv|pdf [path]    - Export the history
  /lang [language]          - Show or change the response language
  /voice                    - Ask a question by voice and hear the answer
  /stop                     - Stop speaking
  /templates                - List legal templates
  /mail <email> <document>  - Email a template document
  /status                   - Show LLM and session status
  /quit                     - Exit

Type any legal question to get started."#
        .to_string()
}

pub fn format_history(log: &InteractionLog) -> String {
    if log.is_empty() {
        return "No interactions yet.\n".to_string();
    }

    let mut output = String::new();
    for (i, turn) in log.turns().iter().enumerate() {
        output.push_str(&format!(
            "{}. User: {}\n   Assistant: {}\n",
            i + 1,
            turn.query(),
            turn.response()
        ));
    }
    output
}

pub fn format_languages(current: Language) -> String {
    let mut output = String::from("Languages:\n");
    for lang in Language::ALL {
        let marker = if lang == current { "*" } else { " " };
        output.push_str(&format!("  {} {}\n", marker, lang.label()));
    }
    output
}

pub fn format_templates(entries: &[TemplateEntry], documents: &[String]) -> String {
    let mut output = String::from("Legal templates:\n");
    for entry in entries {
        let status = if entry.available { "" } else { " (not available)" };
        output.push_str(&format!("  {} - {}{}\n", entry.name, entry.file_name, status));
    }

    if !documents.is_empty() {
        output.push_str("\nDocuments available by email:\n");
        for doc in documents {
            output.push_str(&format!("  {}\n", doc));
        }
    }
    output
}
