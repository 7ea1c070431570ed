// Voice input and output
//
// Speaking is fire-and-forget through a SpeechWorker; listening blocks the
// caller until a transcript arrives or the bound elapses.

mod command;

pub use command::{CommandListener, CommandSpeechEngine};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::constants::STOP_LISTEN_TIMEOUT_SECS;
use crate::config::SpeechConfig;

/// Blocking text-to-speech engine
pub trait SpeechEngine: Send + Sync {
    /// Speak `text`, returning when playback finishes or is stopped
    fn say(&self, text: &str) -> Result<()>;

    /// Interrupt the current utterance, if any
    fn stop(&self);
}

/// Speech-to-text source
#[async_trait]
pub trait SpeechListener: Send + Sync {
    /// Recognized text, or `None` if nothing was heard within `timeout`
    async fn listen(&self, timeout: Duration) -> Result<Option<String>>;
}

/// Plays utterances one at a time, in submission order, off the caller's task
pub struct SpeechWorker {
    engine: Arc<dyn SpeechEngine>,
    tx: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl SpeechWorker {
    /// Start the worker task. Must be called inside a tokio runtime.
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let worker_engine = Arc::clone(&engine);

        let worker = tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                let engine = Arc::clone(&worker_engine);
                match tokio::task::spawn_blocking(move || engine.say(&text)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!("speech failed: {:#}", e),
                    Err(e) => tracing::warn!("speech task panicked: {}", e),
                }
            }
        });

        Self { engine, tx, worker }
    }

    /// Queue `text` for playback and return immediately
    pub fn speak(&self, text: impl Into<String>) {
        if self.tx.send(text.into()).is_err() {
            tracing::warn!("speech worker has shut down");
        }
    }

    /// Stop the current utterance without waiting for queued ones
    pub fn stop(&self) {
        self.engine.stop();
    }

    /// Finish every queued utterance, then end the worker
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            tracing::warn!("speech worker ended abnormally: {}", e);
        }
    }
}

/// Listen briefly and stop playback if the transcript contains "stop".
///
/// Returns true if playback was stopped. Recognition errors count as silence.
pub async fn listen_for_stop(listener: &dyn SpeechListener, worker: &SpeechWorker) -> bool {
    let timeout = Duration::from_secs(STOP_LISTEN_TIMEOUT_SECS);
    match listener.listen(timeout).await {
        Ok(Some(transcript)) if transcript.to_lowercase().contains("stop") => {
            tracing::info!("stop phrase heard");
            worker.stop();
            true
        }
        Ok(_) => false,
        Err(e) => {
            tracing::debug!("stop listener failed: {:#}", e);
            false
        }
    }
}

/// Speech output plus input, built from config
pub struct Voice {
    pub worker: SpeechWorker,
    pub listener: Arc<dyn SpeechListener>,
}

impl Voice {
    /// `None` when voice is disabled
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let engine = Arc::new(CommandSpeechEngine::new(config.tts_command.clone()));
        Some(Self {
            worker: SpeechWorker::new(engine),
            listener: Arc::new(CommandListener::new(config.listen_command.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEngine {
        spoken: Mutex<Vec<String>>,
        stops: AtomicUsize,
    }

    impl SpeechEngine for RecordingEngine {
        fn say(&self, text: &str) -> Result<()> {
            std::thread::sleep(Duration::from_millis(10));
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FixedListener(Option<&'static str>);

    #[async_trait]
    impl SpeechListener for FixedListener {
        async fn listen(&self, _timeout: Duration) -> Result<Option<String>> {
            match self.0 {
                Some("error") => anyhow::bail!("microphone unavailable"),
                other => Ok(other.map(String::from)),
            }
        }
    }

    #[tokio::test]
    async fn test_utterances_play_in_order() {
        let engine = Arc::new(RecordingEngine::default());
        let worker = SpeechWorker::new(engine.clone());

        worker.speak("first");
        worker.speak("second");
        worker.speak("third");
        worker.shutdown().await;

        assert_eq!(
            *engine.spoken.lock().unwrap(),
            vec!["first", "second", "third"]
        );
    }

    #[tokio::test]
    async fn test_stop_phrase_stops_playback() {
        let engine = Arc::new(RecordingEngine::default());
        let worker = SpeechWorker::new(engine.clone());

        assert!(listen_for_stop(&FixedListener(Some("Please STOP now")), &worker).await);
        assert_eq!(engine.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_transcripts_are_ignored() {
        let engine = Arc::new(RecordingEngine::default());
        let worker = SpeechWorker::new(engine.clone());

        assert!(!listen_for_stop(&FixedListener(Some("keep going")), &worker).await);
        assert!(!listen_for_stop(&FixedListener(None), &worker).await);
        assert!(!listen_for_stop(&FixedListener(Some("error")), &worker).await);
        assert_eq!(engine.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_voice_disabled_by_default() {
        assert!(Voice::from_config(&SpeechConfig::default()).is_none());
    }
}
