// Command-backed speech engine and listener
//
// Text-to-speech runs an external program (espeak-ng by default) with the
// utterance as its last argument. Transcription runs a configured command
// that records from the microphone and prints the recognized text.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{SpeechEngine, SpeechListener};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct CommandSpeechEngine {
    command: Vec<String>,
    current: Mutex<Option<Child>>,
    stop_requested: AtomicBool,
}

impl CommandSpeechEngine {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            current: Mutex::new(None),
            stop_requested: AtomicBool::new(false),
        }
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn say(&self, text: &str) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .context("text-to-speech command is empty")?;

        self.stop_requested.store(false, Ordering::SeqCst);

        let child = Command::new(program)
            .args(args)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start text-to-speech command '{}'", program))?;

        *self
            .current
            .lock()
            .map_err(|_| anyhow!("speech engine lock poisoned"))? = Some(child);

        loop {
            {
                let mut guard = self
                    .current
                    .lock()
                    .map_err(|_| anyhow!("speech engine lock poisoned"))?;
                let Some(child) = guard.as_mut() else {
                    return Ok(());
                };
                if let Some(status) = child.try_wait()? {
                    *guard = None;
                    if status.success() || self.stop_requested.load(Ordering::SeqCst) {
                        return Ok(());
                    }
                    bail!("text-to-speech command exited with {}", status);
                }
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        if let Ok(mut guard) = self.current.lock() {
            if let Some(child) = guard.as_mut() {
                if let Err(e) = child.kill() {
                    tracing::debug!("failed to stop speech: {}", e);
                }
            }
        }
    }
}

pub struct CommandListener {
    command: Vec<String>,
}

impl CommandListener {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SpeechListener for CommandListener {
    async fn listen(&self, timeout: Duration) -> Result<Option<String>> {
        let (program, args) = self
            .command
            .split_first()
            .context("no speech listen command configured")?;

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, output).await {
            Ok(Ok(out)) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
                Ok(if text.is_empty() { None } else { Some(text) })
            }
            Ok(Ok(out)) => bail!(
                "listen command exited with {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            ),
            Ok(Err(e)) => Err(e).with_context(|| format!("Failed to run listen command '{}'", program)),
            Err(_) => {
                tracing::debug!(secs = timeout.as_secs(), "nothing heard before timeout");
                Ok(None)
            }
        }
    }
}
