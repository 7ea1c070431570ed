// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::constants::*;

/// Inference server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// When false, replies are never requested and every query degrades to
    /// the localized fallback message
    pub enabled: bool,

    /// Base URL of the inference server (e.g. "http://localhost:11434")
    pub host: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Timeout for each chat attempt, in seconds
    pub request_timeout_secs: u64,

    /// Timeout for the readiness probe, in seconds
    pub probe_timeout_secs: u64,

    /// System instruction sent ahead of the user's question
    pub system_prompt: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: DEFAULT_INFERENCE_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl InferenceConfig {
    /// Config pointing at `host` with every other field at its default
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Host without a trailing slash, ready for path concatenation
    pub fn base_url(&self) -> &str {
        self.host.trim_end_matches('/')
    }
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8501")
    pub bind_address: String,
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
    /// Idle session timeout in minutes
    pub session_timeout_minutes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_HTTP_ADDR.to_string(),
            max_sessions: 100,
            session_timeout_minutes: 30,
        }
    }
}

/// Mail delivery settings. Credentials normally come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// SMTP relay, reached with STARTTLS and logged in to with the credentials
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sendmail-compatible command to pipe messages into instead of SMTP.
    /// Envelope recipients are appended as arguments.
    pub command: Vec<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            command: Vec::new(),
        }
    }
}

impl MailConfig {
    /// Both credentials are present and non-empty
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.username) && present(&self.password)
    }

    /// True when messages go through `command` rather than SMTP
    pub fn uses_sendmail(&self) -> bool {
        !self.command.is_empty()
    }
}

/// Optional passcode gate in front of the assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    #[serde(skip_serializing)]
    pub admin_passcode: Option<String>,
}

impl AccessConfig {
    pub fn is_gated(&self) -> bool {
        self.admin_passcode.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Speech input/output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Voice features are off unless explicitly enabled
    pub enabled: bool,
    /// Text-to-speech command; the utterance is appended as the last argument
    pub tts_command: Vec<String>,
    /// Transcription command; must print the recognized text on stdout
    pub listen_command: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tts_command: vec!["espeak-ng".to_string()],
            listen_command: Vec::new(),
        }
    }
}

/// Template document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub dir: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub inference: InferenceConfig,
    pub server: ServerConfig,
    pub mail: MailConfig,
    pub access: AccessConfig,
    pub speech: SpeechConfig,
    pub templates: TemplatesConfig,
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> Result<()> {
        let host = self.inference.host.trim();
        if host.is_empty() {
            bail!("inference.host must not be empty");
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            bail!(
                "inference.host must start with http:// or https:// (got '{}')",
                host
            );
        }
        if self.inference.model.trim().is_empty() {
            bail!("inference.model must not be empty");
        }
        if self.inference.request_timeout_secs == 0 {
            bail!("inference.request_timeout_secs must be greater than zero");
        }
        if self.inference.probe_timeout_secs == 0 {
            bail!("inference.probe_timeout_secs must be greater than zero");
        }
        if self.mail.smtp_host.trim().is_empty() && !self.mail.uses_sendmail() {
            bail!("mail.smtp_host must not be empty");
        }
        if self.server.max_sessions == 0 {
            bail!("server.max_sessions must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.inference.host, "http://localhost:11434");
        assert_eq!(config.inference.model, "llama3.2:1b");
        assert_eq!(config.inference.request_timeout_secs, 120);
        assert!(config.inference.enabled);
        assert!(!config.speech.enabled);
    }

    #[test]
    fn test_rejects_host_without_scheme() {
        let mut config = Config::default();
        config.inference.host = "localhost:11434".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::default();
        config.inference.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let cfg = InferenceConfig::with_host("http://10.0.0.5:11434/");
        assert_eq!(cfg.base_url(), "http://10.0.0.5:11434");
    }

    #[test]
    fn test_mail_credentials_require_both_values() {
        let mut mail = MailConfig::default();
        assert!(!mail.has_credentials());
        mail.username = Some("clerk@example.com".to_string());
        assert!(!mail.has_credentials());
        mail.password = Some(String::new());
        assert!(!mail.has_credentials());
        mail.password = Some("secret".to_string());
        assert!(mail.has_credentials());
    }

    #[test]
    fn test_mail_defaults_to_smtp_submission() {
        let mail = MailConfig::default();
        assert_eq!(mail.smtp_host, "smtp.gmail.com");
        assert_eq!(mail.smtp_port, 587);
        assert!(!mail.uses_sendmail());

        let mut config = Config::default();
        config.mail.smtp_host = " ".to_string();
        assert!(config.validate().is_err());
        config.mail.command = vec!["sendmail".to_string(), "-i".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_access_gate_ignores_empty_passcode() {
        let mut access = AccessConfig::default();
        assert!(!access.is_gated());
        access.admin_passcode = Some(String::new());
        assert!(!access.is_gated());
        access.admin_passcode = Some("letmein".to_string());
        assert!(access.is_gated());
    }
}
