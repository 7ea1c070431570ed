// Response policy: decides what the assistant says back for one query
//
// Trims the query, refuses anything shorter than MIN_QUERY_CHARS without
// contacting the model, and otherwise asks the reply generator. A missing
// reply degrades to the localized fallback message, so `respond` never fails.

use std::sync::Arc;

use crate::config::constants::MIN_QUERY_CHARS;
use crate::inference::ReplyGenerator;
use crate::locale::no_response_for;
use crate::metrics::{QueryOutcome, METRICS};
use crate::session::ConversationContext;

#[derive(Clone)]
pub struct ResponsePolicy {
    generator: Arc<dyn ReplyGenerator>,
}

impl ResponsePolicy {
    pub fn new(generator: Arc<dyn ReplyGenerator>) -> Self {
        Self { generator }
    }

    /// Produce the response text for `query`.
    ///
    /// Short queries leave `context` untouched. Otherwise the trimmed query is
    /// appended as a user entry, and a successful reply as an assistant entry.
    pub async fn respond(
        &self,
        context: &mut ConversationContext,
        query: &str,
        language_preference: &str,
    ) -> String {
        let fallback = no_response_for(language_preference);

        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            tracing::debug!(chars = trimmed.chars().count(), "query too short, not sent");
            METRICS.record_query(QueryOutcome::Rejected);
            return fallback.to_string();
        }

        context.push_user(trimmed);

        match self.generator.generate_reply(trimmed).await {
            Some(reply) => {
                context.push_assistant(&reply);
                METRICS.record_query(QueryOutcome::Answered);
                reply
            }
            None => {
                METRICS.record_query(QueryOutcome::Fallback);
                fallback.to_string()
            }
        }
    }
}
