// Configuration loader
// Reads ~/.legal-assistant/config.toml (if present) and applies environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "LEGAL_ASSISTANT_CONFIG";

/// Load configuration from the config file and the process environment
pub fn load_config() -> Result<Config> {
    let path = match std::env::var(CONFIG_PATH_ENV) {
        Ok(p) if !p.is_empty() => Some(PathBuf::from(p)),
        _ => default_config_path(),
    };

    let config = match path {
        Some(ref p) if p.exists() => load_from_file(p)?,
        _ => Config::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// `~/.legal-assistant/config.toml`, when a home directory is known
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".legal-assistant").join("config.toml"))
}

/// Parse a TOML config file. Missing sections take their defaults.
pub fn load_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Apply environment overrides on top of `config`.
///
/// `lookup` returns the value of a variable; empty values are ignored.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("OLLAMA_HOST") {
        config.inference.host = normalize_host(&host);
    }
    if let Some(model) = get("OLLAMA_MODEL") {
        config.inference.model = model;
    }
    if let Some(pass) = get("ADMIN_PASS") {
        config.access.admin_passcode = Some(pass);
    }
    if let Some(user) = get("SMTP_USERNAME") {
        config.mail.username = Some(user);
    }
    if let Some(pass) = get("SMTP_PASSWORD") {
        config.mail.password = Some(pass);
    }
    if let Some(host) = get("SMTP_HOST") {
        config.mail.smtp_host = host;
    }
    if let Some(port) = get("SMTP_PORT") {
        match port.trim().parse() {
            Ok(port) => config.mail.smtp_port = port,
            Err(_) => tracing::warn!("ignoring invalid SMTP_PORT '{}'", port),
        }
    }
    if let Some(dir) = get("LEGAL_ASSISTANT_TEMPLATES_DIR") {
        config.templates.dir = PathBuf::from(dir);
    }

    config
}

// Ollama accepts OLLAMA_HOST values like "0.0.0.0:11434"; give those a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_inference_settings() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[
                ("OLLAMA_HOST", "http://gpu-box:11434"),
                ("OLLAMA_MODEL", "qwen2.5:3b"),
            ]),
        );
        assert_eq!(config.inference.host, "http://gpu-box:11434");
        assert_eq!(config.inference.model, "qwen2.5:3b");
    }

    #[test]
    fn test_host_without_scheme_gets_http() {
        let config = apply_env_overrides(Config::default(), env(&[("OLLAMA_HOST", "0.0.0.0:11434")]));
        assert_eq!(config.inference.host, "http://0.0.0.0:11434");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[("OLLAMA_MODEL", "  "), ("ADMIN_PASS", "")]),
        );
        assert_eq!(config.inference.model, "llama3.2:1b");
        assert!(config.access.admin_passcode.is_none());
    }

    #[test]
    fn test_mail_credentials_from_env() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[("SMTP_USERNAME", "desk@example.org"), ("SMTP_PASSWORD", "pw")]),
        );
        assert!(config.mail.has_credentials());
    }

    #[test]
    fn test_smtp_relay_from_env() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[("SMTP_HOST", "mail.example.org"), ("SMTP_PORT", "2525")]),
        );
        assert_eq!(config.mail.smtp_host, "mail.example.org");
        assert_eq!(config.mail.smtp_port, 2525);

        let config = apply_env_overrides(Config::default(), env(&[("SMTP_PORT", "submission")]));
        assert_eq!(config.mail.smtp_port, 587);
    }

    #[test]
    fn test_load_partial_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[inference]\nmodel = \"llama3.1:8b\"\nrequest_timeout_secs = 30\n\n[speech]\nenabled = true\n"
        )
        .unwrap();

        let config = load_from_file(file.path()).unwrap();
        assert_eq!(config.inference.model, "llama3.1:8b");
        assert_eq!(config.inference.request_timeout_secs, 30);
        assert_eq!(config.inference.host, "http://localhost:11434");
        assert!(config.speech.enabled);
        assert_eq!(config.server.max_sessions, 100);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[inference\nmodel = ").unwrap();
        assert!(load_from_file(file.path()).is_err());
    }
}
