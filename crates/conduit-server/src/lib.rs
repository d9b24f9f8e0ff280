//! HTTP server assembly for Conduit

mod health;
mod request_context;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use conduit_auth::CredentialStore;
use conduit_config::Config;
use conduit_gateway::{AnthropicClient, GatewayState, gateway_router};
use tower_http::trace::TraceLayer;

/// Assembled server with routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream client cannot be constructed.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let credentials = config.credentials.as_ref().map(|c| {
            Arc::new(CredentialStore::new(
                c.path.clone(),
                Duration::from_secs(c.refresh_margin_secs),
            ))
        });

        let upstream = AnthropicClient::new(config.upstream.base_url.clone())?;
        let state = GatewayState::new(upstream, config.models, credentials);

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(gateway_router(state));

        // Request context runs innermost, just before handlers
        app = app.layer(axum::middleware::from_fn(request_context::request_context_middleware));
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
