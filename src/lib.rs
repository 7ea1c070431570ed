// Legal Assistant - local-LLM legal information assistant
// Library exports

pub mod access;
pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod inference;
pub mod locale;
pub mod mail;
pub mod metrics;
pub mod policy;
pub mod server;
pub mod session;
pub mod speech;
pub mod templates;

pub use app::AppContext;
pub use errors::{AssistantError, AssistantResult};
pub use policy::ResponsePolicy;
