// Shared services behind every front end
//
// Built once from Config and handed to the REPL or the HTTP server.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::access::AccessGate;
use crate::config::Config;
use crate::inference::{InferenceClient, ReplyGenerator};
use crate::mail::Mailer;
use crate::policy::ResponsePolicy;
use crate::templates::TemplateCatalog;

pub struct AppContext {
    pub config: Config,
    pub inference: Arc<InferenceClient>,
    pub policy: ResponsePolicy,
    pub templates: TemplateCatalog,
    pub mailer: Mailer,
    pub access: AccessGate,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let inference = Arc::new(
            InferenceClient::new(config.inference.clone())
                .context("Failed to create inference client")?,
        );
        Ok(Self::with_inference(config, inference))
    }

    /// Build around an existing inference client (custom backends, tests)
    pub fn with_inference(config: Config, inference: Arc<InferenceClient>) -> Self {
        let generator: Arc<dyn ReplyGenerator> = inference.clone();
        Self {
            policy: ResponsePolicy::new(generator),
            templates: TemplateCatalog::new(config.templates.dir.clone()),
            mailer: Mailer::new(config.mail.clone()),
            access: AccessGate::new(&config.access),
            inference,
            config,
        }
    }

    /// Swap the mailer (e.g. a different transport)
    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = mailer;
        self
    }
}
