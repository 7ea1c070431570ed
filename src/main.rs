// Legal Assistant - local-LLM legal information assistant
// Main entry point

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use legal_assistant::cli::Repl;
use legal_assistant::config::load_config;
use legal_assistant::locale::Language;
use legal_assistant::server::AssistantServer;
use legal_assistant::speech::Voice;
use legal_assistant::AppContext;

/// Legal information assistant backed by a local LLM
#[derive(Parser)]
#[command(name = "legal-assistant", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat session (default)
    Chat {
        /// Response language (name, label or ISO code)
        #[arg(short, long, default_value = "English")]
        language: String,
        /// Enable voice input and spoken replies
        #[arg(long)]
        voice: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Bind address, overriding the config file
        #[arg(long)]
        bind: Option<String>,
    },
    /// Check whether the inference server is ready (exit code 0/1)
    Ready,
    /// List the legal templates and their availability
    Templates,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise derive the level from -v
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "info,legal_assistant=debug",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config()?;
    let command = cli.command.unwrap_or(Command::Chat {
        language: Language::default().label().to_string(),
        voice: false,
    });

    match command {
        Command::Chat { language, voice } => {
            let Some(language) = Language::parse(&language) else {
                anyhow::bail!("unknown language '{}'", language);
            };
            if voice {
                config.speech.enabled = true;
            }
            let voice = Voice::from_config(&config.speech);

            let app = Arc::new(AppContext::new(config)?);
            let mut repl = Repl::new(app, language, voice);
            repl.run().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            let server_config = config.server.clone();
            let app = Arc::new(AppContext::new(config)?);
            AssistantServer::new(app, server_config).serve().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Ready => {
            let app = AppContext::new(config)?;
            let inference = app.inference.config();
            if app.inference.is_ready().await {
                println!("LLM: Ready ({} at {})", inference.model, inference.base_url());
                Ok(ExitCode::SUCCESS)
            } else {
                println!(
                    "LLM: Not ready. Ensure the model '{}' is pulled: ollama run {}",
                    inference.model, inference.model
                );
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Templates => {
            let app = AppContext::new(config)?;
            for entry in app.templates.entries() {
                let status = if entry.available { "available" } else { "missing" };
                println!("{:<26} {:<36} {}", entry.name, entry.file_name, status);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
