//! Web server for filedrop.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::predicate::{DefaultPredicate, NotForContentType, Predicate};
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::file::FileStore;
use crate::{FiledropError, Result};

use super::handlers::AppState;
use super::openapi::create_openapi_router;
use super::router::{
    create_health_router, create_public_files_router, create_router, create_static_router,
};

/// Web server for the file API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Full configuration.
    config: Config,
}

impl WebServer {
    /// Create a new web server.
    ///
    /// Creates the store directory if it does not exist yet.
    pub fn new(config: &Config) -> Result<Self> {
        let ip: IpAddr = config.server.host.parse().map_err(|e| {
            FiledropError::Config(format!("invalid host {:?}: {e}", config.server.host))
        })?;
        let addr = SocketAddr::new(ip, config.server.port);

        let store = FileStore::new(&config.files.storage_path)?;
        tracing::info!("File store initialized at: {}", config.files.storage_path);

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(store)),
            config: config.clone(),
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Assemble the API, health, OpenAPI and optional static routers.
    fn build_router(&self) -> Router {
        let mut router = create_router(
            self.app_state.clone(),
            &self.config.web,
            self.config.files.max_upload_size_bytes(),
        )
        .merge(create_health_router())
        .merge(create_openapi_router());

        if self.config.web.public_files {
            router = router.merge(create_public_files_router(self.app_state.store.base_path()));
        }

        if self.config.web.serve_static {
            if let Some(static_router) = create_static_router(&self.config.web.static_path) {
                router = router.merge(static_router);
            }
        }

        // Downloads are passed through as-is.
        let predicate =
            DefaultPredicate::new().and(NotForContentType::const_new("application/octet-stream"));
        router.layer(CompressionLayer::new().compress_when(predicate))
    }

    /// Bind the listener and build the router.
    async fn bind(&self) -> std::io::Result<(TcpListener, Router)> {
        let listener = TcpListener::bind(self.addr).await?;
        let router = self.build_router();

        tracing::info!("Web server listening on http://{}", listener.local_addr()?);
        Ok((listener, router))
    }

    /// Run the web server until Ctrl-C.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
