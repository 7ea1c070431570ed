// HTTP API server
// Multi-session access to the assistant over JSON

mod handlers;
mod middleware;

pub use handlers::{create_router, health_check, metrics_endpoint, ApiError};
pub use middleware::access_middleware;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::app::AppContext;
use crate::config::ServerConfig;
use crate::session::SessionManager;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Shared state for every request
pub struct AssistantServer {
    app: Arc<AppContext>,
    session_manager: Arc<SessionManager>,
    config: ServerConfig,
}

impl AssistantServer {
    pub fn new(app: Arc<AppContext>, config: ServerConfig) -> Self {
        let session_manager = SessionManager::new(config.max_sessions, config.session_timeout_minutes);
        Self {
            app,
            session_manager: Arc::new(session_manager),
            config,
        }
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.config.bind_address.parse()?;

        // Drop idle sessions in the background
        let sessions = Arc::clone(&self.session_manager);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                sessions.purge_expired();
            }
        });

        let app_state = Arc::new(self);
        let app = create_router(app_state)
            .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
            .layer(TraceLayer::new_for_http());

        tracing::info!("Starting legal assistant API on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn app(&self) -> &Arc<AppContext> {
        &self.app
    }

    pub fn session_manager(&self) -> &Arc<SessionManager> {
        &self.session_manager
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
