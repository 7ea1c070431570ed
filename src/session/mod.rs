// Per-user session state
//
// A session owns its conversation context, interaction log and language
// preference. Nothing is shared between sessions.

mod context;
mod interaction_log;
mod manager;

pub use context::ConversationContext;
pub use interaction_log::{InteractionLog, TableRow, Turn};
pub use manager::{SessionHandle, SessionManager};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::locale::Language;
use crate::policy::ResponsePolicy;

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    language: Language,
    context: ConversationContext,
    log: InteractionLog,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(language: Language) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), language)
    }

    pub(crate) fn with_id(id: String, language: Language) -> Self {
        let now = Utc::now();
        Self {
            id,
            language,
            context: ConversationContext::new(),
            log: InteractionLog::new(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn log(&self) -> &InteractionLog {
        &self.log
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Answer `query` and record the exchange.
    ///
    /// The query is logged exactly as entered (untrimmed), next to whatever
    /// the policy returned, including fallback text.
    pub async fn ask(&mut self, policy: &ResponsePolicy, query: &str) -> String {
        self.last_active = Utc::now();
        let response = policy
            .respond(&mut self.context, query, self.language.label())
            .await;
        self.log.append(query, &response);
        tracing::debug!(session = %self.id, turns = self.log.len(), "turn recorded");
        response
    }

    /// Drop the interaction log. The conversation context is kept.
    pub fn clear_history(&mut self) {
        self.log.clear();
    }

    /// Start over: empty context and log, same id and language
    pub fn reset(&mut self) {
        self.context = ConversationContext::new();
        self.log.clear();
        self.last_active = Utc::now();
    }
}
