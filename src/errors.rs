// User-facing error types
//
// The response pipeline never fails; these cover the collaborators around it
// (mail, templates, sessions, exports, access gate) whose failures must reach
// the user as a readable message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Email not configured. Set SMTP_USERNAME and SMTP_PASSWORD.")]
    MailNotConfigured,

    #[error("Failed to send the document: {0}")]
    MailDelivery(String),

    #[error("Template '{0}' is not available.")]
    TemplateNotFound(String),

    #[error("Session {0} not found")]
    SessionNotFound(String),

    #[error("Session limit reached ({0} active sessions)")]
    SessionLimit(usize),

    #[error("Incorrect passcode")]
    InvalidPasscode,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Speech unavailable: {0}")]
    Speech(String),
}

pub type AssistantResult<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_not_configured_message_names_variables() {
        let msg = AssistantError::MailNotConfigured.to_string();
        assert!(msg.contains("SMTP_USERNAME"));
        assert!(msg.contains("SMTP_PASSWORD"));
    }

    #[test]
    fn test_template_not_found_message() {
        let msg = AssistantError::TemplateNotFound("Lease Agreement".into()).to_string();
        assert_eq!(msg, "Template 'Lease Agreement' is not available.");
    }
}
