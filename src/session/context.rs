// Conversation context for a single session
//
// Tagged "User: ..." / "Assistant: ..." lines recorded as the conversation
// progresses. The context is kept for future use and is not re-sent to the
// inference server.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    entries: Vec<String>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: &str) {
        self.entries.push(format!("User: {}", text));
    }

    pub fn push_assistant(&mut self, text: &str) {
        self.entries.push(format!("Assistant: {}", text));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of exchanges that received an assistant reply
    pub fn answered_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.starts_with("Assistant: "))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_tagged_in_order() {
        let mut ctx = ConversationContext::new();
        ctx.push_user("What is a lease?");
        ctx.push_assistant("A lease is a contract.");
        ctx.push_user("Thanks");

        assert_eq!(
            ctx.entries(),
            &[
                "User: What is a lease?".to_string(),
                "Assistant: A lease is a contract.".to_string(),
                "User: Thanks".to_string(),
            ]
        );
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.answered_count(), 1);
    }

    #[test]
    fn test_new_context_is_empty() {
        let ctx = ConversationContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.answered_count(), 0);
    }
}
