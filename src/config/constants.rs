// Project-wide constants
//
// Centralised here so default endpoints and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Default inference server base URL (Ollama's standard port).
pub const DEFAULT_INFERENCE_HOST: &str = "http://localhost:11434";

/// Default model identifier requested from the inference server.
pub const DEFAULT_MODEL: &str = "llama3.2:1b";

/// Upper bound for a single chat request, per endpoint attempt.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Readiness probe timeout (`GET /api/tags`).
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 2;

/// Queries shorter than this (after trimming, in characters) are not sent
/// to the model.
pub const MIN_QUERY_CHARS: usize = 3;

/// Instruction framing every chat request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You provide non-advisory legal information for India. \
Keep answers concise with a brief disclaimer.";

/// Prefix wrapped around the user's query in the chat payload.
pub const USER_QUESTION_PREFIX: &str = "User question: ";

/// Default bind address for the HTTP API (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8501";

/// Bound for the stop-phrase listener.
pub const STOP_LISTEN_TIMEOUT_SECS: u64 = 5;

/// Default directory holding the downloadable legal templates.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Fixed mail subject and body used when delivering a template document.
pub const MAIL_SUBJECT: &str = "Your Legal Document";
pub const MAIL_BODY: &str = "Please find the attached legal document.";

/// Bound for capturing a spoken question.
pub const VOICE_QUERY_TIMEOUT_SECS: u64 = 30;

/// SMTP relay used for template delivery (STARTTLS on the submission port).
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
