// Callbox - Webhook Server Module
// HTTP endpoint the telephony provider calls on every call-state change

mod handlers;
mod signature;

pub use handlers::{create_router, health_check, AppError, HealthStatus};
pub use signature::{compute_signature, verify_signature, SIGNATURE_HEADER};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::CallboxConfig;
use crate::router::CallRouter;

/// Main webhook server structure
pub struct CallboxServer {
    /// Call flow (shared across requests, immutable)
    router: CallRouter,
    config: CallboxConfig,
}

impl CallboxServer {
    pub fn new(config: CallboxConfig, router: CallRouter) -> Self {
        Self { router, config }
    }

    /// Build the server and its HTTP clients from configuration
    pub fn from_config(config: CallboxConfig) -> Result<Self> {
        let router = CallRouter::from_config(&config).context("Failed to build call router")?;
        Ok(Self::new(config, router))
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.config.bind_address))?;
        let webhook_path = self.config.webhook_path.clone();

        let app = create_router(Arc::new(self)).layer(TraceLayer::new_for_http());

        tracing::info!(%addr, webhook = %webhook_path, "Starting callbox webhook server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn router(&self) -> &CallRouter {
        &self.router
    }

    pub fn config(&self) -> &CallboxConfig {
        &self.config
    }
}
