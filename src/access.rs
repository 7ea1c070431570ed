// Optional passcode gate
//
// When ADMIN_PASS is set every front end asks for it before the assistant is
// usable. Without it the gate is open.

use crate::config::AccessConfig;
use crate::errors::{AssistantError, AssistantResult};

/// Header carrying the passcode on HTTP requests
pub const PASSCODE_HEADER: &str = "x-access-passcode";

#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    passcode: Option<String>,
}

impl AccessGate {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            passcode: config
                .admin_passcode
                .clone()
                .filter(|p| !p.is_empty()),
        }
    }

    pub fn is_gated(&self) -> bool {
        self.passcode.is_some()
    }

    /// Accept `entered` if the gate is open or it matches the passcode exactly
    pub fn check(&self, entered: &str) -> AssistantResult<()> {
        match &self.passcode {
            None => Ok(()),
            Some(expected) if expected == entered => Ok(()),
            Some(_) => {
                tracing::warn!("rejected access attempt");
                Err(AssistantError::InvalidPasscode)
            }
        }
    }
}
