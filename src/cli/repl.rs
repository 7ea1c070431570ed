// Interactive REPL for a single local session

use anyhow::Result;
use crossterm::{style::Stylize, terminal};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use crate::app::AppContext;
use crate::config::constants::VOICE_QUERY_TIMEOUT_SECS;
use crate::export;
use crate::locale::Language;
use crate::session::Session;
use crate::speech::{listen_for_stop, Voice};

use super::commands::{format_help, format_history, format_languages, format_templates, Command};

const MAX_PASSCODE_ATTEMPTS: usize = 3;

/// Get current terminal width, or default to 80 if not a TTY
fn terminal_width() -> usize {
    terminal::size().map(|(w, _)| w as usize).unwrap_or(80)
}

pub struct Repl {
    app: Arc<AppContext>,
    session: Session,
    voice: Option<Voice>,
    is_interactive: bool,
}

impl Repl {
    pub fn new(app: Arc<AppContext>, language: Language, voice: Option<Voice>) -> Self {
        Self {
            app,
            session: Session::new(language),
            voice,
            is_interactive: io::stdout().is_terminal(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;

        let Some(name) = self.login(&mut editor)? else {
            return Ok(());
        };

        let language = self.session.language();
        if self.is_interactive {
            println!("Legal Laws Assistant v{}", env!("CARGO_PKG_VERSION"));
            self.print_llm_status().await;
            println!();
            if name.is_empty() {
                println!("{}! {}", language.welcome(), language.ask_query());
            } else {
                println!("{} {}! {}", language.welcome(), name, language.ask_query());
            }
            println!("{}", "Type /help for commands.".dark_grey());
        } else {
            eprintln!("# Legal Laws Assistant - non-interactive mode");
        }

        loop {
            if self.is_interactive {
                println!();
                self.print_separator();
            }

            let line = match editor.readline("> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            if line.trim().is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(line.as_str());

            if let Some(command) = Command::parse(&line) {
                if command == Command::Quit {
                    break;
                }
                self.handle_command(command).await;
                continue;
            }

            self.answer(&line, false).await;
        }

        if self.is_interactive {
            println!("Goodbye!");
        }
        if let Some(voice) = self.voice.take() {
            voice.worker.stop();
        }
        Ok(())
    }

    /// Passcode gate or name prompt. `None` means the user gave up.
    fn login(&self, editor: &mut DefaultEditor) -> Result<Option<String>> {
        if self.app.access.is_gated() {
            for _ in 0..MAX_PASSCODE_ATTEMPTS {
                let entered = match editor.readline("Enter access passcode to continue: ") {
                    Ok(line) => line,
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };
                match self.app.access.check(&entered) {
                    Ok(()) => return Ok(Some(String::new())),
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            return Ok(None);
        }

        loop {
            match editor.readline("Enter your name to start interaction with legal laws assistant: ") {
                Ok(name) if !name.trim().is_empty() => return Ok(Some(name.trim().to_string())),
                Ok(_) => continue,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Respond to `query`, record the turn, optionally speak the reply
    async fn answer(&mut self, query: &str, speak: bool) {
        let language = self.session.language();
        if self.is_interactive {
            println!("{}", language.thinking().dark_grey());
        }

        let response = self.session.ask(&self.app.policy, query).await;
        println!("{} {}", "Assistant:".cyan(), response);

        if speak {
            if let Some(voice) = &self.voice {
                voice.worker.speak(response);
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Help => println!("{}", format_help()),
            Command::History => print!("{}", format_history(self.session.log())),
            Command::Clear => {
                self.session.clear_history();
                println!("{}", "History cleared".green());
            }
            Command::New => {
                self.session.reset();
                let language = self.session.language();
                println!("{}", "Started a new conversation".green());
                println!("{}", language.ask_query());
            }
            Command::Export { format, path } => {
                match export::export(self.session.log(), format, path.as_deref()) {
                    Ok(written) => println!("Exported to {}", written.display()),
                    Err(e) => eprintln!("{}", format!("Export failed: {:#}", e).red()),
                }
            }
            Command::Language(None) => print!("{}", format_languages(self.session.language())),
            Command::Language(Some(wanted)) => match Language::parse(&wanted) {
                Some(language) => {
                    self.session.set_language(language);
                    println!("{} - {}", language.label(), language.ask_query());
                }
                None => eprintln!(
                    "{}",
                    format!("Unknown language '{}'. Use /lang to list options.", wanted).red()
                ),
            },
            Command::Voice => self.voice_query().await,
            Command::Stop => match &self.voice {
                Some(voice) => voice.worker.stop(),
                None => println!("Voice is disabled."),
            },
            Command::Templates => {
                let entries = self.app.templates.entries();
                let documents = self.app.templates.pdf_documents();
                print!("{}", format_templates(&entries, &documents));
            }
            Command::Mail { to, document } => self.mail_document(&to, &document).await,
            Command::Status => self.print_status().await,
            Command::Usage(usage) => println!("{}", usage),
            Command::Unknown(name) => {
                println!("Unknown command {}. Type /help for commands.", name)
            }
            Command::Quit => {}
        }
    }

    async fn voice_query(&mut self) {
        let Some(voice) = &self.voice else {
            println!("Voice is disabled. Start with --voice to enable it.");
            return;
        };
        let listener = Arc::clone(&voice.listener);

        println!("{}", "Listening...".dark_grey());
        let heard = listener
            .listen(Duration::from_secs(VOICE_QUERY_TIMEOUT_SECS))
            .await;

        match heard {
            Ok(Some(query)) => {
                println!("Voice Input: {}", query);
                self.answer(&query, true).await;
                if let Some(voice) = &self.voice {
                    println!("{}", "Say \"stop\" to interrupt.".dark_grey());
                    listen_for_stop(voice.listener.as_ref(), &voice.worker).await;
                }
            }
            Ok(None) => println!("Voice input unavailable."),
            Err(e) => {
                tracing::warn!("voice capture failed: {:#}", e);
                println!("Voice input unavailable.");
            }
        }
    }

    async fn mail_document(&self, to: &str, document: &str) {
        if !self.app.mailer.is_configured() {
            eprintln!("{}", crate::errors::AssistantError::MailNotConfigured.to_string().red());
            return;
        }

        let result = match self.app.templates.document_path(document) {
            Ok(path) => self.app.mailer.send_document(to, &path).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => println!("{}", format!("✅ Document sent to {} successfully!", to).green()),
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
    }

    async fn print_llm_status(&self) {
        if self.app.inference.is_ready().await {
            println!("LLM: {}", "Ready".green());
        } else {
            println!("LLM: {}", "Not ready".yellow());
        }
    }

    async fn print_status(&self) {
        self.print_llm_status().await;
        let inference = self.app.inference.config();
        println!("Model: {} at {}", inference.model, inference.base_url());
        println!("Language: {}", self.session.language());
        println!(
            "Turns: {} ({} answered by the model)",
            self.session.log().len(),
            self.session.context().answered_count()
        );
        println!(
            "Voice: {}",
            if self.voice.is_some() { "on" } else { "off" }
        );
        println!(
            "Email: {}",
            if self.app.mailer.is_configured() {
                "configured"
            } else {
                "not configured"
            }
        );
    }

    /// Print separator line that adapts to terminal width
    fn print_separator(&self) {
        println!("{}", "─".repeat(terminal_width()).dark_grey());
    }
}
